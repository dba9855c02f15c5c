//! Session and document layer for the OpticStudio side of the pipeline
//!
//! `session` locates the installation and owns the application handle;
//! `system` is the design document the transcriber mutates; `catalog`
//! backs the glass-catalog lookups; `zmx` persists the document in the
//! native lens-file format.

pub mod catalog;
pub mod session;
pub mod system;
pub mod zmx;

pub use catalog::GlassCatalogStore;
pub use session::{Application, Connection, LicenseEdition};
pub use system::{
    Aperture, ApertureType, FieldType, LensUnit, MaterialCell, McOperandType, OpticalSystem,
    RayAimingMethod, Surface, SurfaceType,
};
