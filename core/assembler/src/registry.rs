use crate::{error::CoreError, InnerResult};

use common::utils::ScriptInfo;

use ckb_types::{packed, prelude::*, H256};

use std::collections::HashMap;

const NAME_SEPARATOR: char = '_';

/// Deployed scripts of the network, keyed by name.
///
/// A script is identified by its code hash and hash type, args never take
/// part in a lookup.
#[derive(Clone, Debug, Default)]
pub struct ScriptRegistry {
    scripts: HashMap<String, ScriptInfo>,
}

impl ScriptRegistry {
    pub fn new(scripts: HashMap<String, ScriptInfo>) -> Self {
        ScriptRegistry { scripts }
    }

    pub fn insert(&mut self, name: &str, info: ScriptInfo) {
        self.scripts.insert(name.to_string(), info);
    }

    pub fn get(&self, name: &str) -> Option<&ScriptInfo> {
        self.scripts.get(name)
    }

    pub fn contains(&self, name: &str) -> bool {
        self.scripts.contains_key(name)
    }

    /// Registered names, sorted.
    pub fn script_names(&self) -> Vec<&str> {
        let mut names = self.scripts.keys().map(String::as_str).collect::<Vec<_>>();
        names.sort_unstable();
        names
    }

    pub fn default_script(&self, name: &str) -> InnerResult<packed::Script> {
        self.get(name)
            .map(|info| info.script.clone())
            .ok_or_else(|| CoreError::MissingScriptInfo(name.to_string()))
    }

    pub fn default_cell_dep(&self, name: &str) -> InnerResult<packed::CellDep> {
        self.get(name)
            .map(|info| info.cell_dep.clone())
            .ok_or_else(|| CoreError::MissingScriptInfo(name.to_string()))
    }

    pub fn is_script(&self, script: &packed::Script, name: &str) -> InnerResult<bool> {
        let expected = self.default_script(name)?;
        Ok(is_same_kind(script, &expected))
    }

    /// The most specific registered name of the script kind. Longer names
    /// win, ties break alphabetically.
    pub fn find_script_name(&self, script: &packed::Script) -> Option<&str> {
        self.scripts
            .iter()
            .filter(|(_, info)| is_same_kind(script, &info.script))
            .map(|(name, _)| name.as_str())
            .min_by(|a, b| b.len().cmp(&a.len()).then_with(|| a.cmp(b)))
    }

    /// Cell deps a transaction needs to run the script.
    ///
    /// For a composite name such as `A_B_C` the deps of every registered
    /// prefix (`A`, `A_B`, `A_B_C`) are returned, shortest first.
    pub fn cell_deps_of(&self, script: &packed::Script) -> InnerResult<Vec<packed::CellDep>> {
        let name = self.find_script_name(script).ok_or_else(|| {
            let code_hash: H256 = script.code_hash().unpack();
            CoreError::UnresolvedScript(format!("{:#x}", code_hash))
        })?;

        let deps = name
            .match_indices(NAME_SEPARATOR)
            .map(|(pos, _)| &name[..pos])
            .chain(std::iter::once(name))
            .filter_map(|prefix| self.get(prefix))
            .map(|info| info.cell_dep.clone())
            .collect();

        Ok(deps)
    }
}

pub fn is_same_kind(lhs: &packed::Script, rhs: &packed::Script) -> bool {
    lhs.code_hash() == rhs.code_hash() && lhs.hash_type() == rhs.hash_type()
}
