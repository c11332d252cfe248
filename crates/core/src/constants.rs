//! Physical constants and model defaults

/// Solar constant, W/m²
pub const SOLAR_CONSTANT: f64 = 1360.8;

/// Amplitude of the Earth orbit eccentricity correction
pub const ECCENTRICITY_CORRECTION_FACTOR: f64 = 0.03344;

/// Phase offset of the perigee in the day angle, radians
pub const PERIGEE_OFFSET: f64 = 0.048869;

/// Default ground albedo
pub const ALBEDO_DEFAULT: f64 = 0.2;

/// Default Linke turbidity factor
pub const LINKE_TURBIDITY_DEFAULT: f64 = 2.0;

/// Lower bound of physically possible irradiance, W/m²
pub const LOWER_PHYSICALLY_POSSIBLE_LIMIT: f64 = -4.0;

/// Upper bound of physically possible irradiance, W/m²
pub const UPPER_PHYSICALLY_POSSIBLE_LIMIT: f64 = 2000.0;

/// Expected range of extraterrestrial normal irradiance, W/m²
pub const EXTRATERRESTRIAL_NORMAL_MIN: f64 = 1315.0;
pub const EXTRATERRESTRIAL_NORMAL_MAX: f64 = 1407.0;

/// Bound on absolute solar declination (23.5°), radians
pub const MAX_DECLINATION: f64 = 0.41015237421866746;

/// Angular loss coefficient `a_r` of the Martin & Ruiz reflectivity model
pub const ANGULAR_LOSS_COEFFICIENT: f64 = 0.155;

/// Second-order coefficient `c2` of the Martin & Ruiz non-direct loss
pub const ANGULAR_LOSS_C2: f64 = -0.074;

/// Altitude below which the sun is low above the horizon, radians
pub const LOW_ANGLE_THRESHOLD: f64 = 0.04;

/// Altitude separating sunlit from potentially sunlit surfaces, radians
pub const SUNLIT_ALTITUDE_THRESHOLD: f64 = 0.1;

/// Tilt tolerance around π for the non-direct reflectivity coefficient
pub const TILT_SINGULARITY_EPSILON: f64 = 0.1;

/// Muneer N-term for surfaces in shade
pub const TERM_N_IN_SHADE: f64 = 0.25227;

/// Tilt at or below which a surface counts as horizontal, radians (1°)
pub const FLAT_SURFACE_TILT_THRESHOLD: f64 = 0.017453292519943295;

/// Scale height in the elevation correction `exp(-z / 8434.5)`, m
pub const ATMOSPHERE_SCALE_HEIGHT: f64 = 8434.5;

/// Floor for the diffuse transmission function
pub const MIN_DIFFUSE_TRANSMISSION: f64 = 1e-6;

/// Default capacity of a memoization cache
pub const CACHE_CAPACITY_DEFAULT: usize = 24;
