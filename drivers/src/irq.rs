//! Interrupt line binding as seen by the drivers.
//!
//! The interrupt controller itself belongs to the platform. Drivers only
//! attach and detach handlers through [`IrqController`].

/// Handler run with interrupts disabled when its line fires.
pub type IrqHandler = fn(irq: u8);

#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum IrqError {
    /// Another handler already owns the line under this id.
    LineInUse,
    /// Nothing was bound for this line and id.
    NotBound,
    /// The controller has no such line.
    InvalidLine,
}

pub trait IrqController {
    /// Attach `handler` to `irq`. `id` identifies the binding for a later
    /// `unbind_irq`; `policy` is passed through to the controller.
    fn bind_irq(
        &mut self,
        irq: u8,
        id: u32,
        handler: IrqHandler,
        policy: u32,
    ) -> Result<(), IrqError>;

    fn unbind_irq(&mut self, irq: u8, id: u32) -> Result<(), IrqError>;
}
