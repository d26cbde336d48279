use serde::{Deserialize, Serialize};

use crate::constants::PARACHUTE_DEPLOY_DURATION;
use crate::control::propulsion::Motor;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum FlightPhase {
    OnRail,
    Powered,
    Coast,
    ParachuteDeploying,
    ParachuteDeployed,
}

impl FlightPhase {
    pub fn is_aerodynamic(self) -> bool {
        matches!(self, FlightPhase::Powered | FlightPhase::Coast)
    }

    pub fn is_under_parachute(self) -> bool {
        matches!(
            self,
            FlightPhase::ParachuteDeploying | FlightPhase::ParachuteDeployed
        )
    }

    pub fn parachute_state(self) -> ParachuteState {
        match self {
            FlightPhase::ParachuteDeploying => ParachuteState::Deploying,
            FlightPhase::ParachuteDeployed => ParachuteState::FullyDeployed,
            _ => ParachuteState::NotDeployed,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum ParachuteState {
    #[default]
    NotDeployed,
    Deploying,
    FullyDeployed,
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PhaseSchedule {
    pub burn_time: f64,
    pub ejection_time: f64,
    pub full_deployment_time: f64,
    pub rail_length: f64,
}

impl PhaseSchedule {
    pub fn new(motor: &Motor, rail_length: f64) -> Self {
        let ejection_time = motor.ejection_time();
        PhaseSchedule {
            burn_time: motor.burn_time(),
            ejection_time,
            full_deployment_time: ejection_time + PARACHUTE_DEPLOY_DURATION,
            rail_length,
        }
    }

    pub fn is_on_rail(&self, distance_from_origin: f64, left_rail: bool) -> bool {
        !left_rail && distance_from_origin < self.rail_length
    }

    pub fn phase_at(&self, time: f64, on_rail: bool) -> FlightPhase {
        if time >= self.full_deployment_time {
            FlightPhase::ParachuteDeployed
        } else if time >= self.ejection_time {
            FlightPhase::ParachuteDeploying
        } else if on_rail {
            FlightPhase::OnRail
        } else if time < self.burn_time {
            FlightPhase::Powered
        } else {
            FlightPhase::Coast
        }
    }

    pub fn deployment_progress(&self, time: f64) -> f64 {
        if time < self.ejection_time {
            0.0
        } else {
            ((time - self.ejection_time) / PARACHUTE_DEPLOY_DURATION).clamp(0.0, 1.0)
        }
    }

    pub fn in_stability_window(&self, time: f64) -> bool {
        time >= self.burn_time && time < self.ejection_time
    }
}
