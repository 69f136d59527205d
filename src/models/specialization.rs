use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

/// One skill category and its level thresholds (`level → minimum points`).
///
/// Level keys are strings in the authored file (`"1"`, `"2"`, ...).
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
pub struct SpecializationCategory {
    pub id: String,
    #[serde(default)]
    pub nome: Option<String>,
    #[serde(default)]
    pub descricao: Option<String>,
    #[serde(default)]
    pub niveis: BTreeMap<String, u32>,
}

impl SpecializationCategory {
    /// Thresholds as `(level, min_points)` sorted by numeric level.
    ///
    /// Keys that are not numbers are ignored.
    pub fn thresholds(&self) -> Vec<(u32, u32)> {
        let mut levels: Vec<(u32, u32)> = self
            .niveis
            .iter()
            .filter_map(|(level, min)| level.trim().parse::<u32>().ok().map(|l| (l, *min)))
            .collect();
        levels.sort_by_key(|(level, _)| *level);
        levels
    }
}

/// Skill levels needed before an interaction is allowed.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
pub struct InteractionRequirement {
    #[serde(default)]
    pub requisitos_nivel: BTreeMap<String, u32>,
}

/// Contents of `data/sistema-especializacao.json`.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
pub struct SpecializationConfig {
    #[serde(default)]
    pub categorias: Vec<SpecializationCategory>,
    /// `interaction type → interaction id → requirement`
    #[serde(default)]
    pub interacoes: BTreeMap<String, BTreeMap<String, InteractionRequirement>>,
}

impl SpecializationConfig {
    pub fn category(&self, id: &str) -> Option<&SpecializationCategory> {
        self.categorias.iter().find(|c| c.id == id)
    }

    pub fn interaction_requirement(
        &self,
        interaction_type: &str,
        interaction_id: &str,
    ) -> Option<&BTreeMap<String, u32>> {
        self.interacoes
            .get(interaction_type)
            .and_then(|by_id| by_id.get(interaction_id))
            .map(|req| &req.requisitos_nivel)
            .filter(|req| !req.is_empty())
    }
}
