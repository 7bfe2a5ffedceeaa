//! Single combatant on an encounter roster.

use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::environment::Environment;
use crate::runtime::{Effect, Identified, Reducer};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Combatant {
    pub id: Uuid,
    pub name: String,
    /// Distinguishes same-named combatants ("Goblin 2").
    pub discriminator: Option<i32>,
    pub hit_points: HitPoints,
    pub initiative: Option<i32>,
    pub is_player: bool,
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct HitPoints {
    pub maximum: i32,
    pub current: i32,
}

impl HitPoints {
    pub fn full(maximum: i32) -> Self {
        Self {
            maximum,
            current: maximum,
        }
    }
}

impl Combatant {
    pub fn new(id: Uuid, name: impl Into<String>, maximum_hp: i32) -> Self {
        Self {
            id,
            name: name.into(),
            discriminator: None,
            hit_points: HitPoints::full(maximum_hp),
            initiative: None,
            is_player: false,
        }
    }

    pub fn player(id: Uuid, name: impl Into<String>, maximum_hp: i32) -> Self {
        Self {
            is_player: true,
            ..Self::new(id, name, maximum_hp)
        }
    }

    pub fn null_instance() -> Self {
        Self::new(Uuid::nil(), String::new(), 0)
    }

    pub fn display_name(&self) -> String {
        match self.discriminator {
            Some(n) => format!("{} {}", self.name, n),
            None => self.name.clone(),
        }
    }

    pub fn is_down(&self) -> bool {
        self.hit_points.current <= 0
    }
}

impl Identified for Combatant {
    type Id = Uuid;

    fn id(&self) -> Uuid {
        self.id
    }
}

#[derive(Debug, Clone, PartialEq)]
pub enum CombatantAction {
    ApplyDamage(i32),
    Heal(i32),
    SetInitiative(Option<i32>),
    Rename(String),
}

pub fn reducer() -> Reducer<Combatant, CombatantAction, Environment> {
    Reducer::new(|combatant: &mut Combatant, action, _env| {
        match action {
            CombatantAction::ApplyDamage(amount) => {
                combatant.hit_points.current = (combatant.hit_points.current - amount).max(0);
            }
            CombatantAction::Heal(amount) => {
                combatant.hit_points.current =
                    (combatant.hit_points.current + amount).min(combatant.hit_points.maximum);
            }
            CombatantAction::SetInitiative(initiative) => {
                combatant.initiative = initiative;
            }
            CombatantAction::Rename(name) => {
                combatant.name = name;
            }
        }
        Effect::none()
    })
}
