//! On-disk representation of user-supplied annotations

use crate::analysis::{Analysis, EntryPoint, JumpTable};
use crate::arch::StateChange;
use crate::maths::u24;
use crate::project::Result;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fs;
use std::path::Path;

/// A subroutine-scoped assertion in its persisted form.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct SubroutineAssertion {
    pub subroutine_pc: u24,
    pub pc: u24,
    pub state_change: StateChange,
}

/// The user-authored half of an analysis.
///
/// Only data the user supplied is stored; everything derived from the
/// ROM is regenerated by [`Analysis::run`] after [`Project::apply`].
#[derive(Clone, Debug, Default, Serialize, Deserialize)]
pub struct Project {
    #[serde(default)]
    pub entry_points: Vec<EntryPoint>,

    #[serde(default)]
    pub comments: BTreeMap<u24, String>,

    #[serde(default)]
    pub labels: BTreeMap<u24, String>,

    #[serde(default)]
    pub instruction_assertions: BTreeMap<u24, StateChange>,

    #[serde(default)]
    pub subroutine_assertions: Vec<SubroutineAssertion>,

    #[serde(default)]
    pub jump_tables: BTreeMap<u24, JumpTable>,
}

impl Project {
    /// Load a project file.
    pub fn read<P: AsRef<Path>>(path: P) -> Result<Project> {
        Ok(serde_json::from_str(&fs::read_to_string(path)?)?)
    }

    /// Save the project file.
    pub fn write<P: AsRef<Path>>(&self, path: P) -> Result<()> {
        fs::write(path, serde_json::to_string_pretty(self)?)?;
        Ok(())
    }

    /// Capture the user data currently held by an analysis.
    pub fn from_analysis(analysis: &Analysis) -> Project {
        Project {
            entry_points: analysis.entry_points().cloned().collect(),
            comments: analysis.comments().clone(),
            labels: analysis.user_labels().clone(),
            instruction_assertions: analysis.instruction_assertions().clone(),
            subroutine_assertions: analysis
                .subroutine_assertions()
                .iter()
                .map(|((subroutine_pc, pc), state_change)| SubroutineAssertion {
                    subroutine_pc: *subroutine_pc,
                    pc: *pc,
                    state_change: *state_change,
                })
                .collect(),
            jump_tables: analysis.jump_tables().clone(),
        }
    }

    /// Seed an analysis with this project's user data. Derived results
    /// are not touched; run the analysis afterwards.
    pub fn apply(&self, analysis: &mut Analysis) {
        for entry in &self.entry_points {
            analysis.add_entry_point(entry.label.clone(), entry.pc, entry.state);
        }
        for (pc, comment) in &self.comments {
            analysis.set_comment(*pc, comment.clone());
        }
        for (pc, label) in &self.labels {
            analysis.rename_label(*pc, label.clone());
        }
        for (pc, state_change) in &self.instruction_assertions {
            analysis.assert_instruction(*pc, *state_change);
        }
        for assertion in &self.subroutine_assertions {
            analysis.assert_subroutine(assertion.subroutine_pc, assertion.pc, assertion.state_change);
        }
        for (pc, table) in &self.jump_tables {
            analysis.restore_jump_table(*pc, table.clone());
        }
    }
}
