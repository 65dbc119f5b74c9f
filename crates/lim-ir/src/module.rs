//! Modules for multi-function programs.

use alloc::{collections::BTreeMap, string::String, vec::Vec};
use core::fmt;

use crate::function::Function;

/// A module containing multiple functions.
///
/// A module is the top-level unit a pass runs over: functions by name,
/// plus an optional entry point.
#[derive(Debug, Clone)]
pub struct Module {
    /// Functions in this module, indexed by name.
    pub functions: BTreeMap<String, Function>,
    /// Name of the entry function (if any).
    pub entry_function: Option<String>,
}

impl Module {
    /// Create a new empty module.
    pub fn new() -> Self {
        Self {
            functions: BTreeMap::new(),
            entry_function: None,
        }
    }

    /// Add a function to this module.
    ///
    /// # Panics
    ///
    /// Panics if a function with the same name already exists.
    pub fn add_function(&mut self, name: String, func: Function) {
        if self.functions.contains_key(&name) {
            panic!("Function '{}' already exists in module", name);
        }
        self.functions.insert(name, func);
    }

    /// Get a function by name.
    pub fn get_function(&self, name: &str) -> Option<&Function> {
        self.functions.get(name)
    }

    /// Get a mutable reference to a function by name.
    pub fn get_function_mut(&mut self, name: &str) -> Option<&mut Function> {
        self.functions.get_mut(name)
    }

    /// Set the entry function.
    ///
    /// # Panics
    ///
    /// Panics if the function doesn't exist in the module.
    pub fn set_entry_function(&mut self, name: String) {
        if !self.functions.contains_key(&name) {
            panic!("Function '{}' does not exist in module", name);
        }
        self.entry_function = Some(name);
    }

    /// Get the number of functions in this module.
    pub fn function_count(&self) -> usize {
        self.functions.len()
    }

    /// Get all function names.
    pub fn function_names(&self) -> Vec<&String> {
        self.functions.keys().collect()
    }
}

impl Default for Module {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Display for Module {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "module {{")?;

        if let Some(entry) = &self.entry_function {
            writeln!(f, "entry: %{}", entry)?;
        }

        for func in self.functions.values() {
            writeln!(f)?;
            write!(f, "{}", func)?;
        }

        writeln!(f, "}}")?;
        Ok(())
    }
}
