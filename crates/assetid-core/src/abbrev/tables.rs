//! Built-in abbreviation tables, keyed by lowercase label.

/// Location-flavored codes: areas and rooms, plus the equipment and system names that also
/// show up in location columns.
pub const LOCATION_ABBREVIATIONS: &[(&str, &str)] = &[
    // Locations
    ("compound management office", "CMO"),
    ("management office", "MGO"),
    ("food court", "FC"),
    ("ladies gym area", "LGA"),
    ("gents gym area", "GGA"),
    ("gameplay area", "GPA"),
    ("kids play area", "KPA"),
    ("cafeteria", "CAF"),
    ("display area", "DSP"),
    // Equipment
    ("exhaust fan", "EXF"),
    ("supply fan", "SF"),
    ("air handling unit", "AHU"),
    ("fan coil unit", "FCU"),
    ("split ac", "SAC"),
    ("package unit", "PKU"),
    ("cooling tower", "CT"),
    ("water heater", "WH"),
    ("distribution board", "DB"),
    // Systems
    ("hvac", "HVC"),
    ("electrical", "ELE"),
    ("plumbing", "PLB"),
    ("fire protection", "FPS"),
    ("security", "SEC"),
];

/// Equipment-flavored codes.
pub const EQUIPMENT_ABBREVIATIONS: &[(&str, &str)] = &[
    // HVAC
    ("exhaust fan", "EXF"),
    ("supply fan", "SF"),
    ("air handling unit", "AHU"),
    ("fan coil unit", "FCU"),
    ("split ac", "SAC"),
    ("package unit", "PKU"),
    ("cooling tower", "CT"),
    ("chiller", "CHR"),
    ("ductless split unit", "DSU"),
    // Electrical
    ("electrical lighting fixtures", "ELF"),
    ("light fixture", "LF"),
    ("distribution board", "DB"),
    ("transformer", "TRF"),
    ("ups", "UPS"),
    ("generator", "GEN"),
    ("water heater", "WH"),
    // Plumbing
    ("plumbing accessories", "PLB"),
    ("sanitary wares", "SNW"),
    ("sanitary wares & fittings", "SNW"),
    ("water pump", "WP"),
    ("water tank", "WT"),
    // Fire
    ("fire alarm", "FA"),
    ("fire extinguisher", "FE"),
    ("sprinkler", "SPK"),
    // Building systems
    ("elevator", "ELV"),
    ("escalator", "ESC"),
    ("cctv", "CCTV"),
    ("access control", "ACC"),
    // Asset systems, used when a row names no equipment
    ("hvac", "HVC"),
    ("electrical", "ELE"),
    ("plumbing", "PLB"),
    ("fire protection", "FPS"),
    ("security", "SEC"),
    ("appliances", "APP"),
    ("none", "EQP"),
];

/// Asset system names accepted by the equipment value checker as standard classes.
pub const EQUIPMENT_CLASSES: &[&str] = &[
    "hvac",
    "electrical",
    "plumbing",
    "fire protection",
    "security",
    "appliances",
];
