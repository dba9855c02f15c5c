//! In-memory optical design document
//!
//! Mirrors the mutation surface the transcriber drives on the primary
//! system: the surface table (LDE), system data (units, aperture, fields,
//! wavelengths, ray aiming, glass catalogs) and the multi-configuration
//! editor (MCE). A fresh document matches a new lens file: object, stop
//! and image surface, one wavelength, one field.

use crate::error::LensResult;
use crate::zemax::catalog::GlassCatalogStore;
use crate::zemax::zmx;
use std::collections::BTreeMap;
use std::fmt;
use std::path::Path;

//==============================================================================
// System-data enums
//==============================================================================

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum LensUnit {
    #[default]
    Millimeters,
    Centimeters,
    Inches,
    Meters,
}

impl LensUnit {
    /// Map a unit name from the workbook, case-insensitive, full names and
    /// abbreviations. Anything unrecognized is millimeters.
    pub fn from_name(name: &str) -> Self {
        match name.trim().to_lowercase().as_str() {
            "meters" | "meter" | "m" => LensUnit::Meters,
            "inches" | "inch" | "in" => LensUnit::Inches,
            "centimeters" | "centimeter" | "cm" => LensUnit::Centimeters,
            _ => LensUnit::Millimeters,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ApertureType {
    #[default]
    EntrancePupilDiameter,
    ImageSpaceFNum,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum RayAimingMethod {
    #[default]
    Off,
    Paraxial,
    Real,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum FieldType {
    #[default]
    Angle,
    RealImageHeight,
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Aperture {
    pub aperture_type: ApertureType,
    pub value: f64,
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Wavelength {
    /// Micrometers.
    pub value: f64,
    pub weight: f64,
    pub primary: bool,
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Field {
    pub x: f64,
    pub y: f64,
    pub weight: f64,
}

//==============================================================================
// Surfaces
//==============================================================================

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum SurfaceType {
    #[default]
    Standard,
    ExtendedOddAsphere,
}

impl fmt::Display for SurfaceType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SurfaceType::Standard => write!(f, "Standard"),
            SurfaceType::ExtendedOddAsphere => write!(f, "ExtendedOddAsphere"),
        }
    }
}

/// Material cell of a surface row: empty, a named glass, or an
/// index/Abbe-number model solve.
#[derive(Debug, Clone, PartialEq, Default)]
pub enum MaterialCell {
    #[default]
    Empty,
    Glass(String),
    ModelSolve {
        index_nd: f64,
        abbe_vd: f64,
    },
}

impl fmt::Display for MaterialCell {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            MaterialCell::Empty => Ok(()),
            MaterialCell::Glass(name) => write!(f, "{}", name),
            MaterialCell::ModelSolve { index_nd, abbe_vd } => {
                write!(f, "{:.4},{:.2}", index_nd, abbe_vd)
            }
        }
    }
}

/// A generic indexed editor cell on a surface.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum ParamCell {
    Int(i64),
    Double(f64),
}

#[derive(Debug, Clone, PartialEq)]
pub struct Surface {
    pub surface_type: SurfaceType,
    pub comment: String,
    pub radius: f64,
    pub thickness: f64,
    pub material: MaterialCell,
    pub semi_diameter: f64,
    pub mechanical_semi_diameter: f64,
    pub chip_zone: f64,
    pub conic: f64,
    pub is_stop: bool,
    params: BTreeMap<u32, ParamCell>,
}

impl Default for Surface {
    fn default() -> Self {
        Self {
            surface_type: SurfaceType::Standard,
            comment: String::new(),
            radius: f64::INFINITY,
            thickness: 0.0,
            material: MaterialCell::Empty,
            semi_diameter: 0.0,
            mechanical_semi_diameter: 0.0,
            chip_zone: 0.0,
            conic: 0.0,
            is_stop: false,
            params: BTreeMap::new(),
        }
    }
}

impl Surface {
    pub fn change_type(&mut self, surface_type: SurfaceType) {
        self.surface_type = surface_type;
    }

    pub fn set_material(&mut self, name: impl Into<String>) {
        self.material = MaterialCell::Glass(name.into());
    }

    pub fn set_material_solve(&mut self, index_nd: f64, abbe_vd: f64) {
        self.material = MaterialCell::ModelSolve { index_nd, abbe_vd };
    }

    pub fn set_cell_int(&mut self, cell: u32, value: i64) {
        self.params.insert(cell, ParamCell::Int(value));
    }

    pub fn set_cell_double(&mut self, cell: u32, value: f64) {
        self.params.insert(cell, ParamCell::Double(value));
    }

    pub fn cell_int(&self, cell: u32) -> Option<i64> {
        match self.params.get(&cell)? {
            ParamCell::Int(v) => Some(*v),
            ParamCell::Double(_) => None,
        }
    }

    pub fn cell_double(&self, cell: u32) -> Option<f64> {
        match self.params.get(&cell)? {
            ParamCell::Double(v) => Some(*v),
            ParamCell::Int(v) => Some(*v as f64),
        }
    }

    pub fn param_cells(&self) -> impl Iterator<Item = (u32, ParamCell)> + '_ {
        self.params.iter().map(|(k, v)| (*k, *v))
    }
}

//==============================================================================
// Multi-configuration editor
//==============================================================================

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum McOperandType {
    /// System aperture value (APER).
    Aperture,
    /// Field Y value (YFIE).
    YField,
    /// Surface thickness (THIC).
    Thickness,
}

impl fmt::Display for McOperandType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            McOperandType::Aperture => write!(f, "APER"),
            McOperandType::YField => write!(f, "YFIE"),
            McOperandType::Thickness => write!(f, "THIC"),
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct McOperand {
    pub operand_type: McOperandType,
    /// Field index (zero-based) for YFIE, surface number for THIC.
    pub param: i64,
    values: Vec<f64>,
}

impl McOperand {
    pub fn set_param(&mut self, param: i64) {
        self.param = param;
    }

    /// Set the value for a configuration, 1-based.
    pub fn set_value(&mut self, config: usize, value: f64) {
        if config >= 1 && config <= self.values.len() {
            self.values[config - 1] = value;
        }
    }

    pub fn value(&self, config: usize) -> Option<f64> {
        if config >= 1 {
            self.values.get(config - 1).copied()
        } else {
            None
        }
    }

    pub fn values(&self) -> &[f64] {
        &self.values
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct MultiConfigEditor {
    num_configurations: usize,
    operands: Vec<McOperand>,
}

impl MultiConfigEditor {
    pub fn new() -> Self {
        Self {
            num_configurations: 1,
            operands: Vec::new(),
        }
    }

    pub fn num_configurations(&self) -> usize {
        self.num_configurations
    }

    pub fn add_configuration(&mut self) {
        self.num_configurations += 1;
        for operand in &mut self.operands {
            operand.values.push(0.0);
        }
    }

    pub fn add_operand(&mut self, operand_type: McOperandType) -> &mut McOperand {
        self.operands.push(McOperand {
            operand_type,
            param: 0,
            values: vec![0.0; self.num_configurations],
        });
        self.operands.last_mut().unwrap()
    }

    pub fn operands(&self) -> &[McOperand] {
        &self.operands
    }
}

impl Default for MultiConfigEditor {
    fn default() -> Self {
        Self::new()
    }
}

//==============================================================================
// The design document
//==============================================================================

#[derive(Debug, Clone)]
pub struct OpticalSystem {
    units: LensUnit,
    surfaces: Vec<Surface>,
    wavelengths: Vec<Wavelength>,
    fields: Vec<Field>,
    field_type: FieldType,
    aperture: Aperture,
    ray_aiming: RayAimingMethod,
    catalogs_in_use: Vec<String>,
    catalog_store: GlassCatalogStore,
    mce: MultiConfigEditor,
}

impl OpticalSystem {
    /// A new document: object, stop and image surface, one wavelength at
    /// 0.55 µm, one on-axis field, SCHOTT as the default catalog.
    pub fn new() -> Self {
        let object = Surface {
            thickness: f64::INFINITY,
            ..Surface::default()
        };
        let stop = Surface {
            is_stop: true,
            ..Surface::default()
        };
        let image = Surface::default();

        Self {
            units: LensUnit::Millimeters,
            surfaces: vec![object, stop, image],
            wavelengths: vec![Wavelength {
                value: 0.55,
                weight: 1.0,
                primary: true,
            }],
            fields: vec![Field {
                x: 0.0,
                y: 0.0,
                weight: 1.0,
            }],
            field_type: FieldType::Angle,
            aperture: Aperture {
                aperture_type: ApertureType::EntrancePupilDiameter,
                value: 0.0,
            },
            ray_aiming: RayAimingMethod::Off,
            catalogs_in_use: vec!["SCHOTT".to_string()],
            catalog_store: GlassCatalogStore::empty(),
            mce: MultiConfigEditor::new(),
        }
    }

    pub fn with_catalogs(mut self, store: GlassCatalogStore) -> Self {
        self.catalog_store = store;
        self
    }

    //--------------------------------------------------------------------------
    // Surfaces
    //--------------------------------------------------------------------------

    pub fn num_surfaces(&self) -> usize {
        self.surfaces.len()
    }

    /// Insert a fresh standard surface, shifting later rows down.
    pub fn insert_new_surface_at(&mut self, index: usize) {
        let index = index.min(self.surfaces.len());
        self.surfaces.insert(index, Surface::default());
    }

    pub fn surface(&self, index: usize) -> Option<&Surface> {
        self.surfaces.get(index)
    }

    pub fn surface_mut(&mut self, index: usize) -> Option<&mut Surface> {
        self.surfaces.get_mut(index)
    }

    pub fn surfaces(&self) -> &[Surface] {
        &self.surfaces
    }

    /// Flag `index` as the aperture stop; at most one surface holds the
    /// flag.
    pub fn set_stop(&mut self, index: usize) {
        if index >= self.surfaces.len() {
            return;
        }
        for surface in &mut self.surfaces {
            surface.is_stop = false;
        }
        self.surfaces[index].is_stop = true;
    }

    pub fn stop_index(&self) -> Option<usize> {
        self.surfaces.iter().position(|s| s.is_stop)
    }

    //--------------------------------------------------------------------------
    // Wavelengths (1-based, like the editor)
    //--------------------------------------------------------------------------

    pub fn num_wavelengths(&self) -> usize {
        self.wavelengths.len()
    }

    pub fn wavelength(&self, number: usize) -> Option<&Wavelength> {
        (number >= 1).then(|| self.wavelengths.get(number - 1)).flatten()
    }

    pub fn wavelength_mut(&mut self, number: usize) -> Option<&mut Wavelength> {
        if number >= 1 {
            self.wavelengths.get_mut(number - 1)
        } else {
            None
        }
    }

    pub fn add_wavelength(&mut self, value: f64, weight: f64) {
        self.wavelengths.push(Wavelength {
            value,
            weight,
            primary: false,
        });
    }

    /// Make wavelength `number` (1-based) primary. Returns false when out
    /// of range.
    pub fn set_primary_wavelength(&mut self, number: usize) -> bool {
        if number < 1 || number > self.wavelengths.len() {
            return false;
        }
        for w in &mut self.wavelengths {
            w.primary = false;
        }
        self.wavelengths[number - 1].primary = true;
        true
    }

    pub fn primary_wavelength(&self) -> Option<usize> {
        self.wavelengths.iter().position(|w| w.primary).map(|i| i + 1)
    }

    pub fn wavelengths(&self) -> &[Wavelength] {
        &self.wavelengths
    }

    //--------------------------------------------------------------------------
    // Fields (1-based)
    //--------------------------------------------------------------------------

    pub fn num_fields(&self) -> usize {
        self.fields.len()
    }

    pub fn field_mut(&mut self, number: usize) -> Option<&mut Field> {
        if number >= 1 {
            self.fields.get_mut(number - 1)
        } else {
            None
        }
    }

    pub fn add_field(&mut self, x: f64, y: f64, weight: f64) {
        self.fields.push(Field { x, y, weight });
    }

    pub fn set_field_type(&mut self, field_type: FieldType) {
        self.field_type = field_type;
    }

    pub fn field_type(&self) -> FieldType {
        self.field_type
    }

    pub fn fields(&self) -> &[Field] {
        &self.fields
    }

    //--------------------------------------------------------------------------
    // System data
    //--------------------------------------------------------------------------

    pub fn set_lens_units(&mut self, units: LensUnit) {
        self.units = units;
    }

    pub fn lens_units(&self) -> LensUnit {
        self.units
    }

    pub fn set_aperture(&mut self, aperture_type: ApertureType, value: f64) {
        self.aperture = Aperture {
            aperture_type,
            value,
        };
    }

    pub fn aperture(&self) -> Aperture {
        self.aperture
    }

    pub fn set_ray_aiming(&mut self, method: RayAimingMethod) {
        self.ray_aiming = method;
    }

    pub fn ray_aiming(&self) -> RayAimingMethod {
        self.ray_aiming
    }

    //--------------------------------------------------------------------------
    // Glass catalogs
    //--------------------------------------------------------------------------

    pub fn catalogs_in_use(&self) -> &[String] {
        &self.catalogs_in_use
    }

    pub fn add_catalog(&mut self, name: &str) {
        if !self.catalogs_in_use.iter().any(|c| c == name) {
            self.catalogs_in_use.push(name.to_string());
        }
    }

    pub fn remove_catalog(&mut self, name: &str) {
        self.catalogs_in_use.retain(|c| c != name);
    }

    pub fn available_catalogs(&self) -> Vec<String> {
        self.catalog_store.available_catalogs()
    }

    pub fn materials_in_catalog(&self, catalog: &str) -> LensResult<Vec<String>> {
        self.catalog_store.materials_in_catalog(catalog)
    }

    //--------------------------------------------------------------------------
    // Multi-configuration editor
    //--------------------------------------------------------------------------

    pub fn mce(&self) -> &MultiConfigEditor {
        &self.mce
    }

    pub fn mce_mut(&mut self) -> &mut MultiConfigEditor {
        &mut self.mce
    }

    //--------------------------------------------------------------------------
    // Persistence
    //--------------------------------------------------------------------------

    /// Save the document to `path` in the native lens-file format,
    /// overwriting any existing file.
    pub fn save_as(&self, path: &Path) -> LensResult<()> {
        zmx::write_system(self, path)
    }
}

impl Default for OpticalSystem {
    fn default() -> Self {
        Self::new()
    }
}
