pub mod led;
pub mod spi;

#[cfg(feature = "board")]
pub mod delay;
#[cfg(feature = "board")]
pub mod flash;
#[cfg(feature = "board")]
pub mod pins;
#[cfg(feature = "board")]
pub mod usart;

#[cfg(test)]
pub(crate) mod testing;

pub use led::{Led, StatusLeds};
pub use spi::{BitBangBus, ChipSelect};

#[cfg(feature = "board")]
pub use delay::CycleDelay;
#[cfg(feature = "board")]
pub use flash::Sector;
#[cfg(feature = "board")]
pub use pins::BoardPins;
#[cfg(feature = "board")]
pub use usart::Console;
