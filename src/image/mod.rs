//! Owned image buffers used throughout the crate.
//!
//! - [`DepthImage`]: 16-bit depth in millimetres, `0` = no return.
//! - [`ImageF32`]: float plane for filter intermediates.
//! - [`Mask`]: binary edge/non-edge flags.
//!
//! All buffers are tightly packed (stride equals width) and expose rows
//! through [`ImageView`].
pub mod depth;
pub mod f32;
pub mod io;
pub mod mask;
pub mod traits;

pub use self::depth::DepthImage;
pub use self::f32::ImageF32;
pub use self::mask::Mask;
pub use self::traits::{ImageView, ImageViewMut, Rows};
