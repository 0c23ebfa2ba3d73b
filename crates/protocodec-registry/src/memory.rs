//! In-memory `SchemaRegistry` implementation.
//!
//! Suitable for testing, CLI use, and embedded deployments.
//! Thread-safe via `Arc<RwLock<Inner>>`.

use protocodec_core::{
    error::RegistryError,
    schema::{check_references, MessageSchema, SchemaRegistry, ServiceSchema},
};
use std::{
    collections::{HashMap, HashSet},
    path::{Path, PathBuf},
    sync::{Arc, PoisonError, RwLock, RwLockReadGuard, RwLockWriteGuard},
};
use tracing::{debug, info};

use crate::psdl::{Definition, PsdlParser};

#[derive(Default)]
struct Inner {
    messages: HashMap<String, Arc<MessageSchema>>,
    services: HashMap<String, Arc<ServiceSchema>>,
}

impl Inner {
    fn contains(&self, name: &str) -> bool {
        self.messages.contains_key(name) || self.services.contains_key(name)
    }

    fn insert(&mut self, def: Definition) {
        match def {
            Definition::Message(m) => {
                debug!(message = %m.name, fields = m.fields.len(), "registered message");
                self.messages.insert(m.name.clone(), Arc::new(m));
            }
            Definition::Service(s) => {
                debug!(service = %s.name, methods = s.methods.len(), "registered service");
                self.services.insert(s.name.clone(), Arc::new(s));
            }
        }
    }
}

/// Thread-safe in-memory schema registry.
///
/// Message and service names share one namespace; adding a name twice is
/// an error. References between schemas are not checked on insert, so
/// files can be loaded in any order; call
/// [`MemoryRegistry::check_references`] once everything is loaded.
#[derive(Clone, Default)]
pub struct MemoryRegistry {
    inner: Arc<RwLock<Inner>>,
}

impl MemoryRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    // Writers validate and check names before mutating, so a poisoned lock
    // still guards consistent data.
    fn read(&self) -> RwLockReadGuard<'_, Inner> {
        self.inner.read().unwrap_or_else(PoisonError::into_inner)
    }

    fn write(&self) -> RwLockWriteGuard<'_, Inner> {
        self.inner.write().unwrap_or_else(PoisonError::into_inner)
    }

    /// Validate and add a message schema.
    pub fn add_message(&self, schema: MessageSchema) -> Result<(), RegistryError> {
        self.add(Definition::Message(schema))
    }

    /// Validate and add a service schema.
    pub fn add_service(&self, service: ServiceSchema) -> Result<(), RegistryError> {
        self.add(Definition::Service(service))
    }

    /// Add one parsed PSDL definition.
    pub fn add(&self, def: Definition) -> Result<(), RegistryError> {
        self.add_all(vec![def]).map(|_| ())
    }

    /// Add a batch of definitions, all or nothing: if any fails validation
    /// or collides with a registered name (or another member of the batch),
    /// the registry is left unchanged.
    pub fn add_all(&self, defs: Vec<Definition>) -> Result<usize, RegistryError> {
        for def in &defs {
            match def {
                Definition::Message(m) => m.validate()?,
                Definition::Service(s) => s.validate()?,
            }
        }
        let mut inner = self.write();
        let mut batch = HashSet::new();
        for def in &defs {
            if inner.contains(def.name()) || !batch.insert(def.name()) {
                return Err(RegistryError::AlreadyExists {
                    name: def.name().to_string(),
                });
            }
        }
        let count = defs.len();
        for def in defs {
            inner.insert(def);
        }
        Ok(count)
    }

    /// Parse and add every document of a PSDL string, all or nothing.
    /// Returns the number of definitions added.
    pub fn load_str(&self, yaml: &str) -> Result<usize, RegistryError> {
        self.add_all(PsdlParser::parse_all(yaml)?)
    }

    /// Load a single PSDL file.
    ///
    /// If the file contains multiple documents (separated by `---`), all
    /// are added. Returns the count of definitions loaded.
    pub fn load_file(&self, path: &Path) -> Result<usize, RegistryError> {
        let content = std::fs::read_to_string(path).map_err(RegistryError::Io)?;
        let count = self.load_str(&content).map_err(|e| match e {
            RegistryError::ParseError(msg) => {
                RegistryError::ParseError(format!("{}: {msg}", path.display()))
            }
            other => other,
        })?;
        if count == 0 {
            return Err(RegistryError::ParseError(format!(
                "{}: empty PSDL file",
                path.display()
            )));
        }
        Ok(count)
    }

    /// Load all `.psdl` files from a directory recursively.
    ///
    /// Returns the total number of definitions loaded.
    pub fn load_directory(&self, dir: &Path) -> Result<usize, RegistryError> {
        let mut count = 0;
        let mut files = walkdir_psdl(dir)?;
        files.sort();
        for path in &files {
            count += self.load_file(path)?;
        }
        info!(dir = %dir.display(), files = files.len(), definitions = count, "loaded PSDL directory");
        Ok(count)
    }

    /// Verify every message-typed field and every method input / output
    /// resolves to a registered message.
    pub fn check_references(&self) -> Result<(), RegistryError> {
        check_references(self)
    }

    /// Number of registered messages.
    pub fn len(&self) -> usize {
        self.read().messages.len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// All message names, sorted.
    pub fn all_names(&self) -> Vec<String> {
        self.message_names()
    }

    /// All messages, sorted by name.
    pub fn all_messages(&self) -> Vec<Arc<MessageSchema>> {
        let inner = self.read();
        let mut all: Vec<_> = inner.messages.values().cloned().collect();
        all.sort_by(|a, b| a.name.cmp(&b.name));
        all
    }

    /// All services, sorted by name.
    pub fn all_services(&self) -> Vec<Arc<ServiceSchema>> {
        let inner = self.read();
        let mut all: Vec<_> = inner.services.values().cloned().collect();
        all.sort_by(|a, b| a.name.cmp(&b.name));
        all
    }
}

impl SchemaRegistry for MemoryRegistry {
    fn message(&self, name: &str) -> Option<Arc<MessageSchema>> {
        self.read().messages.get(name).cloned()
    }

    fn service(&self, name: &str) -> Option<Arc<ServiceSchema>> {
        self.read().services.get(name).cloned()
    }

    fn message_names(&self) -> Vec<String> {
        let mut names: Vec<String> = self.read().messages.keys().cloned().collect();
        names.sort();
        names
    }

    fn service_names(&self) -> Vec<String> {
        let mut names: Vec<String> = self.read().services.keys().cloned().collect();
        names.sort();
        names
    }
}

/// Collect all `.psdl` files under `dir` recursively.
fn walkdir_psdl(dir: &Path) -> Result<Vec<PathBuf>, RegistryError> {
    let mut files = Vec::new();
    if !dir.is_dir() {
        return Err(RegistryError::Io(std::io::Error::new(
            std::io::ErrorKind::NotFound,
            format!("{} is not a directory", dir.display()),
        )));
    }
    for entry in std::fs::read_dir(dir).map_err(RegistryError::Io)? {
        let entry = entry.map_err(RegistryError::Io)?;
        let path = entry.path();
        if path.is_dir() {
            files.extend(walkdir_psdl(&path)?);
        } else if path.extension().is_some_and(|e| e == "psdl") {
            files.push(path);
        }
    }
    Ok(files)
}
