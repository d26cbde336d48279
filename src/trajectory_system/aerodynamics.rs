use serde::{Deserialize, Serialize};
use std::f64::consts::PI;
use tracing::warn;

use crate::constants::{
    AIR_DENSITY_SEA_LEVEL, FIN_DIVERGENCE_SPEED_RANGE, FIN_FLUTTER_SPEED_RANGE, SEA_LEVEL_PRESSURE,
    SPEED_OF_SOUND,
};
use crate::control::rocket::{NoseShape, RocketGeometry, RocketParameters};

const FIN_FRONTAL_CORRECTION: f64 = 0.5;
const NOSE_NORMAL_FORCE_COEFFICIENT: f64 = 2.0;
const FLUTTER_CONSTANT: f64 = 1.337;

// Stability-check weighting of the side-view areas
const STABILITY_NOSE_WEIGHT: f64 = 1.0;
const STABILITY_BODY_WEIGHT: f64 = 0.25;
const STABILITY_FIN_WEIGHT: f64 = 1.75;

#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ProjectedAreas {
    pub frontal: f64,
    pub nose_side: f64,
    pub body_side: f64,
    pub single_fin: f64,
    pub total_fin: f64, // two fins' worth regardless of count
    pub side: f64,
    pub angled: f64,
}

#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Volumes {
    pub nose: f64,
    pub body: f64,
    pub fins: f64,
    pub total: f64,
}

#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CentersOfPressure {
    pub nose: f64,
    pub body: f64,
    pub fin: f64,
    pub overall: f64,
    pub stability: f64,
}

#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FinSpeeds {
    pub divergence: f64,
    pub flutter: f64,
}

#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AerodynamicProfile {
    pub is_valid: bool,
    pub areas: ProjectedAreas,
    pub volumes: Volumes,
    pub centers: CentersOfPressure,
    pub fin_aerodynamic_center: f64,
    pub aerodynamic_center: f64,
    pub static_margin: f64,
    pub stability_static_margin: f64,
    pub fin_speeds: FinSpeeds,
    pub moment_of_inertia: f64,
}

impl AerodynamicProfile {
    pub fn compute(geometry: &RocketGeometry) -> Self {
        let areas = calculate_projected_area(geometry);
        let volumes = calculate_volume(geometry);
        let fin_aerodynamic_center = fin_aerodynamic_center(geometry);
        let centers = calculate_centers_of_pressure(geometry, &areas, fin_aerodynamic_center);
        let aerodynamic_center = calculate_aerodynamic_center(geometry, &areas, &volumes);

        AerodynamicProfile {
            is_valid: true,
            areas,
            volumes,
            centers,
            fin_aerodynamic_center,
            aerodynamic_center,
            static_margin: static_margin(
                centers.overall,
                geometry.center_of_gravity,
                geometry.body_diameter,
            ),
            stability_static_margin: static_margin(
                centers.stability,
                geometry.center_of_gravity,
                geometry.body_diameter,
            ),
            fin_speeds: calculate_fin_speeds(geometry, &areas),
            moment_of_inertia: geometry.moment_of_inertia(),
        }
    }

    pub fn from_parameters(params: &RocketParameters) -> Self {
        match RocketGeometry::from_parameters(params) {
            Ok(geometry) => AerodynamicProfile::compute(&geometry),
            Err(err) => {
                warn!("aerodynamic profile unavailable, using zeroed values: {}", err);
                AerodynamicProfile::invalid()
            }
        }
    }

    pub fn invalid() -> Self {
        AerodynamicProfile::default()
    }
}

pub fn calculate_projected_area(geometry: &RocketGeometry) -> ProjectedAreas {
    let radius = geometry.body_radius();
    let fin_count = f64::from(geometry.fins.count());

    let frontal = PI * radius.powi(2)
        + FIN_FRONTAL_CORRECTION * fin_count * geometry.fin_thickness * geometry.fin_height;

    let nose_side = match geometry.nose_shape {
        NoseShape::Cone => 0.5 * geometry.body_diameter * geometry.nose_height,
        NoseShape::Parabola | NoseShape::Ogive => {
            2.0 / 3.0 * geometry.body_diameter * geometry.nose_height
        }
    };
    let body_side = geometry.body_diameter * geometry.body_height;

    let single_fin = (geometry.fin_root_chord + geometry.fin_tip_chord) / 2.0 * geometry.fin_height;
    let total_fin = geometry
        .fins
        .exposed_side_area(single_fin, geometry.fin_root_chord, radius);

    let side = nose_side + body_side + total_fin;
    let angled = (frontal + side) * std::f64::consts::FRAC_1_SQRT_2;

    ProjectedAreas {
        frontal,
        nose_side,
        body_side,
        single_fin,
        total_fin,
        side,
        angled,
    }
}

pub fn calculate_volume(geometry: &RocketGeometry) -> Volumes {
    let cross_section = PI * geometry.body_radius().powi(2);
    let nose_fraction = match geometry.nose_shape {
        NoseShape::Cone => 1.0 / 3.0,
        NoseShape::Parabola => 0.5,
        NoseShape::Ogive => 0.53,
    };

    let nose = nose_fraction * cross_section * geometry.nose_height;
    let body = cross_section * geometry.body_height;
    let single_fin = (geometry.fin_root_chord + geometry.fin_tip_chord) / 2.0 * geometry.fin_height;
    let fins = f64::from(geometry.fins.count()) * single_fin * geometry.fin_thickness;

    Volumes {
        nose,
        body,
        fins,
        total: nose + body + fins,
    }
}

pub fn nose_center_of_pressure(geometry: &RocketGeometry) -> f64 {
    let fraction = match geometry.nose_shape {
        NoseShape::Cone => 2.0 / 3.0,
        NoseShape::Parabola => 0.5,
        NoseShape::Ogive => 0.466,
    };
    fraction * geometry.nose_height
}

// a swept fin is split into two triangles whose sectional moments are summed
pub fn fin_centroid_offset(geometry: &RocketGeometry) -> f64 {
    let root = geometry.fin_root_chord;
    let tip = geometry.fin_tip_chord;
    let sweep = geometry.fin_sweep;

    if root + tip <= 0.0 {
        return 0.0;
    }

    if sweep > 0.0 {
        let leading_area = root / 2.0;
        let leading_x = (root + sweep) / 3.0;
        let trailing_area = tip / 2.0;
        let trailing_x = (root + 2.0 * sweep + tip) / 3.0;
        (leading_area * leading_x + trailing_area * trailing_x) / (leading_area + trailing_area)
    } else {
        (root.powi(2) + root * tip + tip.powi(2)) / (3.0 * (root + tip))
    }
}

pub fn mean_aerodynamic_chord(geometry: &RocketGeometry) -> (f64, f64) {
    let root = geometry.fin_root_chord;
    if root <= 0.0 {
        return (0.0, 0.0);
    }
    let taper = geometry.taper_ratio();
    let mac = 2.0 / 3.0 * root * (1.0 + taper + taper.powi(2)) / (1.0 + taper);
    let spanwise = geometry.fin_height / 3.0 * (1.0 + 2.0 * taper) / (1.0 + taper);
    let leading_edge = if geometry.fin_height > 0.0 {
        geometry.fin_sweep * spanwise / geometry.fin_height
    } else {
        0.0
    };
    (mac, leading_edge)
}

pub fn fin_aerodynamic_center(geometry: &RocketGeometry) -> f64 {
    let (mac, leading_edge) = mean_aerodynamic_chord(geometry);
    geometry.fin_root_leading_edge() + leading_edge + 0.25 * mac
}

pub fn fin_aspect_ratio(geometry: &RocketGeometry, single_fin_area: f64) -> f64 {
    if single_fin_area > 0.0 {
        2.0 * geometry.fin_height.powi(2) / single_fin_area
    } else {
        0.0
    }
}

// Helmbold lift-curve slope, per radian
pub fn lift_curve_slope(aspect_ratio: f64) -> f64 {
    2.0 * PI * aspect_ratio / (2.0 + (4.0 + aspect_ratio.powi(2)).sqrt())
}

pub fn calculate_centers_of_pressure(
    geometry: &RocketGeometry,
    areas: &ProjectedAreas,
    fin_aerodynamic_center: f64,
) -> CentersOfPressure {
    let nose = nose_center_of_pressure(geometry);
    let body = geometry.nose_height + geometry.body_height / 2.0;
    let fin = geometry.fin_root_leading_edge() + fin_centroid_offset(geometry);

    let overall = weighted_position(&[
        (areas.nose_side, nose),
        (areas.body_side, body),
        (areas.total_fin, fin),
    ]);
    let stability = weighted_position(&[
        (STABILITY_NOSE_WEIGHT * areas.nose_side, nose),
        (STABILITY_BODY_WEIGHT * areas.body_side, body),
        (STABILITY_FIN_WEIGHT * areas.total_fin, fin_aerodynamic_center),
    ]);

    CentersOfPressure {
        nose,
        body,
        fin,
        overall,
        stability,
    }
}

pub fn calculate_aerodynamic_center(
    geometry: &RocketGeometry,
    areas: &ProjectedAreas,
    volumes: &Volumes,
) -> f64 {
    let nose_position = nose_center_of_pressure(geometry);
    let reference_area = PI * geometry.body_radius().powi(2);
    if reference_area <= 0.0 {
        return nose_position;
    }

    let radius = geometry.body_radius();
    let interference = 1.0 + radius / (geometry.fin_height + radius);
    let volume_interference = if volumes.nose + volumes.body > 0.0 {
        1.0 + volumes.fins / (volumes.nose + volumes.body)
    } else {
        1.0
    };
    let slope = lift_curve_slope(fin_aspect_ratio(geometry, areas.single_fin));
    let fin_coefficient = interference
        * slope
        * f64::from(geometry.fins.count())
        / 2.0
        * areas.single_fin
        / reference_area
        * volume_interference;

    weighted_position(&[
        (NOSE_NORMAL_FORCE_COEFFICIENT, nose_position),
        (fin_coefficient, fin_aerodynamic_center(geometry)),
    ])
}

pub fn static_margin(center_of_pressure: f64, center_of_gravity: f64, body_diameter: f64) -> f64 {
    if body_diameter > 0.0 {
        (center_of_pressure - center_of_gravity) / body_diameter
    } else {
        0.0
    }
}

pub fn calculate_fin_speeds(geometry: &RocketGeometry, areas: &ProjectedAreas) -> FinSpeeds {
    FinSpeeds {
        divergence: clamp_speed(
            divergence_speed(geometry, areas.single_fin),
            FIN_DIVERGENCE_SPEED_RANGE,
        ),
        flutter: clamp_speed(
            flutter_speed(geometry, areas.single_fin),
            FIN_FLUTTER_SPEED_RANGE,
        ),
    }
}

fn divergence_speed(geometry: &RocketGeometry, single_fin_area: f64) -> f64 {
    let mean_chord = (geometry.fin_root_chord + geometry.fin_tip_chord) / 2.0;
    let torsion_constant = mean_chord * geometry.fin_thickness.powi(3) / 3.0;
    let (mac, _) = mean_aerodynamic_chord(geometry);
    let eccentricity = 0.25 * mac;
    let slope = lift_curve_slope(fin_aspect_ratio(geometry, single_fin_area));

    let divergence_pressure = geometry.fin_material.shear_modulus() * torsion_constant
        / (eccentricity * slope * single_fin_area * geometry.fin_height);
    (2.0 * divergence_pressure / AIR_DENSITY_SEA_LEVEL).sqrt()
}

// NACA TN 4197 flutter boundary at sea level
fn flutter_speed(geometry: &RocketGeometry, single_fin_area: f64) -> f64 {
    let aspect_ratio = geometry.fin_height.powi(2) / single_fin_area;
    let taper = geometry.taper_ratio();
    let thickness_ratio = geometry.fin_thickness / geometry.fin_root_chord;

    let denominator = FLUTTER_CONSTANT * aspect_ratio.powi(3) * SEA_LEVEL_PRESSURE * (taper + 1.0)
        / (2.0 * (aspect_ratio + 2.0) * thickness_ratio.powi(3));
    SPEED_OF_SOUND * (geometry.fin_material.shear_modulus() / denominator).sqrt()
}

fn clamp_speed(speed: f64, range: (f64, f64)) -> f64 {
    if speed.is_nan() {
        range.0
    } else {
        speed.clamp(range.0, range.1)
    }
}

fn weighted_position(parts: &[(f64, f64)]) -> f64 {
    let total_weight: f64 = parts.iter().map(|(weight, _)| weight).sum();
    if total_weight <= 0.0 {
        return 0.0;
    }
    parts
        .iter()
        .map(|(weight, position)| weight * position)
        .sum::<f64>()
        / total_weight
}
