//! Session layer: locate the OpticStudio installation, validate the
//! license class, hand out the primary optical system.
//!
//! Initialization failures are the fatal class of errors: installation
//! not found, license not valid for API use, no primary system. They all
//! abort before any transcription. The application handle releases its
//! session exactly once, on drop at the latest.

use crate::error::{LensError, LensResult};
use crate::zemax::catalog::GlassCatalogStore;
use crate::zemax::system::OpticalSystem;
use std::fmt;
use std::fs;
use std::path::{Path, PathBuf};

/// Overrides installation discovery when set.
pub const ZEMAX_ROOT_ENV: &str = "ZEMAX_ROOT";

/// Default installation paths, newest release first.
const DEFAULT_INSTALL_PATHS: &[&str] = &[
    r"C:\Program Files\ANSYS Inc\v252\Zemax OpticStudio",
    r"C:\Program Files\ANSYS Inc\v251\Zemax OpticStudio",
];

//==============================================================================
// Connection
//==============================================================================

/// A located installation; the step before an application handle exists.
#[derive(Debug, Clone)]
pub struct Connection {
    root: PathBuf,
}

impl Connection {
    /// Locate an installation: `ZEMAX_ROOT`, then the default install
    /// paths.
    pub fn discover() -> LensResult<Self> {
        if let Ok(root) = std::env::var(ZEMAX_ROOT_ENV) {
            return Self::with_root(root);
        }
        for path in DEFAULT_INSTALL_PATHS {
            if Path::new(path).is_dir() {
                return Self::with_root(path);
            }
        }
        Err(LensError::Initialization(format!(
            "no installation found; set {} or pass an explicit root",
            ZEMAX_ROOT_ENV
        )))
    }

    pub fn with_root(root: impl Into<PathBuf>) -> LensResult<Self> {
        let root = root.into();
        if root.is_dir() {
            Ok(Self { root })
        } else {
            Err(LensError::Initialization(format!(
                "{} is not an installation directory",
                root.display()
            )))
        }
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    pub fn create_application(&self) -> LensResult<Application> {
        Application::connect(&self.root)
    }
}

//==============================================================================
// License
//==============================================================================

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LicenseEdition {
    Premium,
    Enterprise,
    Professional,
    Standard,
    Invalid,
}

impl LicenseEdition {
    fn parse(value: &str) -> Self {
        match value.trim().to_lowercase().as_str() {
            "premium" => LicenseEdition::Premium,
            "enterprise" => LicenseEdition::Enterprise,
            "professional" => LicenseEdition::Professional,
            "standard" => LicenseEdition::Standard,
            _ => LicenseEdition::Invalid,
        }
    }

    pub fn is_valid_for_api(&self) -> bool {
        !matches!(self, LicenseEdition::Invalid)
    }
}

impl fmt::Display for LicenseEdition {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            LicenseEdition::Premium => "Premium",
            LicenseEdition::Enterprise => "Enterprise",
            LicenseEdition::Professional => "Professional",
            LicenseEdition::Standard => "Standard",
            LicenseEdition::Invalid => "Invalid",
        };
        write!(f, "{}", name)
    }
}

/// License edition recorded in `<root>/license.dat` (`edition=<name>`).
/// Missing or unreadable data is an invalid license.
fn read_license_edition(root: &Path) -> LicenseEdition {
    let Ok(content) = fs::read_to_string(root.join("license.dat")) else {
        return LicenseEdition::Invalid;
    };
    for line in content.lines() {
        if let Some((key, value)) = line.split_once('=') {
            if key.trim().eq_ignore_ascii_case("edition") {
                return LicenseEdition::parse(value);
            }
        }
    }
    LicenseEdition::Invalid
}

//==============================================================================
// Application
//==============================================================================

/// The session handle: owns the primary system for its lifetime and
/// closes the session when dropped.
#[derive(Debug)]
pub struct Application {
    root: PathBuf,
    license: LicenseEdition,
    catalogs: GlassCatalogStore,
    system: Option<OpticalSystem>,
}

impl Application {
    fn connect(root: &Path) -> LensResult<Self> {
        let license = read_license_edition(root);
        if !license.is_valid_for_api() {
            return Err(LensError::License(format!(
                "no usable license under {}",
                root.display()
            )));
        }

        let catalogs = GlassCatalogStore::from_install_root(root);
        tracing::debug!(
            root = %root.display(),
            license = %license,
            "OpticStudio session opened"
        );

        let system = OpticalSystem::new().with_catalogs(catalogs.clone());
        Ok(Self {
            root: root.to_path_buf(),
            license,
            catalogs,
            system: Some(system),
        })
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    pub fn license_edition(&self) -> LicenseEdition {
        self.license
    }

    /// The active design document.
    pub fn primary_system(&mut self) -> LensResult<&mut OpticalSystem> {
        self.system.as_mut().ok_or(LensError::SystemNotPresent)
    }

    /// Reset the primary system to a fresh document.
    pub fn new_system(&mut self) -> LensResult<&mut OpticalSystem> {
        self.system = Some(OpticalSystem::new().with_catalogs(self.catalogs.clone()));
        self.primary_system()
    }

    /// Release the session. Idempotent; also runs on drop.
    pub fn close(&mut self) {
        if self.system.take().is_some() {
            tracing::debug!(root = %self.root.display(), "OpticStudio session closed");
        }
    }
}

impl Drop for Application {
    fn drop(&mut self) {
        self.close();
    }
}
