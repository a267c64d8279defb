//! Conditional installation of `SMap` as a host environment's map type.
//!
//! A host may already provide a map implementation. `Host::install` checks
//! it against the minimal contract below and only substitutes `SMap` when
//! the provider is missing or incomplete, unless told to replace it.

use crate::map::SMap;
use crate::value::Value;
use std::rc::Rc;
use tracing::debug;

/// The minimal map contract a host provider must offer.
pub trait MapContract {
    fn get(&self, key: &Value) -> Value;
    fn set(&mut self, key: Value, value: Value);
    fn has(&self, key: &Value) -> bool;
    fn delete(&mut self, key: &Value) -> bool;
    fn size(&self) -> usize;
    fn for_each(&self, f: &mut dyn FnMut(&Value, &Value));
}

impl MapContract for SMap<Value, Value> {
    fn get(&self, key: &Value) -> Value {
        SMap::get(self, key).cloned().unwrap_or_default()
    }

    fn set(&mut self, key: Value, value: Value) {
        SMap::set(self, key, value);
    }

    fn has(&self, key: &Value) -> bool {
        SMap::has(self, key)
    }

    fn delete(&mut self, key: &Value) -> bool {
        SMap::delete(self, key)
    }

    fn size(&self) -> usize {
        self.len()
    }

    fn for_each(&self, f: &mut dyn FnMut(&Value, &Value)) {
        SMap::for_each(self, |v, k, _| f(v, k));
    }
}

/// What a provider claims to support.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct Capabilities {
    /// Construction from a sequence of key/value pairs.
    pub construct: bool,
    pub get: bool,
    pub set: bool,
    pub has: bool,
    pub delete: bool,
    pub size: bool,
    pub for_each: bool,
}

impl Capabilities {
    pub const FULL: Capabilities = Capabilities {
        construct: true,
        get: true,
        set: true,
        has: true,
        delete: true,
        size: true,
        for_each: true,
    };

    pub fn is_complete(&self) -> bool {
        *self == Self::FULL
    }

    /// Names of the contract members the provider lacks.
    pub fn missing(&self) -> Vec<&'static str> {
        [
            ("construct", self.construct),
            ("get", self.get),
            ("set", self.set),
            ("has", self.has),
            ("delete", self.delete),
            ("size", self.size),
            ("forEach", self.for_each),
        ]
        .into_iter()
        .filter(|(_, present)| !present)
        .map(|(name, _)| name)
        .collect()
    }
}

pub trait MapProvider {
    fn name(&self) -> &str;
    fn capabilities(&self) -> Capabilities;
    fn construct(&self, entries: Vec<(Value, Value)>) -> Box<dyn MapContract>;
}

/// Provider backed by [`SMap`].
#[derive(Debug, Clone, Copy, Default)]
pub struct SMapProvider;

impl MapProvider for SMapProvider {
    fn name(&self) -> &str {
        "smap"
    }

    fn capabilities(&self) -> Capabilities {
        Capabilities::FULL
    }

    fn construct(&self, entries: Vec<(Value, Value)>) -> Box<dyn MapContract> {
        Box::new(entries.into_iter().collect::<SMap<Value, Value>>())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum InstallMode {
    /// Install only when no complete provider is present.
    #[default]
    IfAbsent,
    /// Always substitute `SMap`.
    Replace,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Installation {
    /// The existing provider was complete and left in place.
    Kept { provider: String },
    /// `SMap` was installed; `replaced` names the provider it displaced.
    Installed { replaced: Option<String> },
}

/// A host environment's map slot.
#[derive(Default)]
pub struct Host {
    map: Option<Rc<dyn MapProvider>>,
    installed: Option<Installation>,
}

impl Host {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_provider(provider: Rc<dyn MapProvider>) -> Self {
        Self {
            map: Some(provider),
            installed: None,
        }
    }

    pub fn provider(&self) -> Option<&Rc<dyn MapProvider>> {
        self.map.as_ref()
    }

    /// Runs the capability check and installs `SMap` if needed. Only the
    /// first call decides; later calls return the recorded outcome.
    pub fn install(&mut self, mode: InstallMode) -> Installation {
        if let Some(done) = &self.installed {
            return done.clone();
        }
        let outcome = match self.map.as_deref() {
            Some(existing) if mode == InstallMode::IfAbsent && existing.capabilities().is_complete() => {
                debug!(provider = existing.name(), "complete map provider present, keeping it");
                Installation::Kept {
                    provider: existing.name().to_string(),
                }
            }
            existing => {
                let replaced = existing.map(|p| p.name().to_string());
                match existing {
                    Some(p) => debug!(
                        provider = p.name(),
                        missing = ?p.capabilities().missing(),
                        ?mode,
                        "replacing map provider"
                    ),
                    None => debug!("no map provider present, installing smap"),
                }
                Installation::Installed { replaced }
            }
        };
        if let Installation::Installed { .. } = outcome {
            self.map = Some(Rc::new(SMapProvider));
        }
        self.installed.insert(outcome).clone()
    }

    /// Constructs a map through the installed provider.
    pub fn new_map(&self, entries: Vec<(Value, Value)>) -> Option<Box<dyn MapContract>> {
        self.map.as_ref().map(|p| p.construct(entries))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    struct Partial;
    impl MapProvider for Partial {
        fn name(&self) -> &str {
            "partial"
        }
        fn capabilities(&self) -> Capabilities {
            Capabilities {
                for_each: false,
                ..Capabilities::FULL
            }
        }
        fn construct(&self, entries: Vec<(Value, Value)>) -> Box<dyn MapContract> {
            SMapProvider.construct(entries)
        }
    }

    #[test]
    fn missing_lists_absent_members() {
        assert!(Capabilities::FULL.missing().is_empty());
        assert_eq!(Partial.capabilities().missing(), ["forEach"]);
        assert_eq!(Capabilities::default().missing().len(), 7);
    }

    #[test]
    fn empty_host_gets_smap() {
        let mut host = Host::new();
        assert!(host.new_map(Vec::new()).is_none());
        assert_eq!(host.install(InstallMode::IfAbsent), Installation::Installed { replaced: None });
        assert_eq!(host.provider().map(|p| p.name().to_string()).as_deref(), Some("smap"));
    }

    #[test]
    fn partial_provider_is_replaced() {
        let mut host = Host::with_provider(Rc::new(Partial));
        assert_eq!(
            host.install(InstallMode::IfAbsent),
            Installation::Installed {
                replaced: Some("partial".to_string())
            }
        );
    }

    #[test]
    fn install_decides_once() {
        let mut host = Host::new();
        let first = host.install(InstallMode::IfAbsent);
        let second = host.install(InstallMode::Replace);
        assert_eq!(first, second);

        let mut host = Host::with_provider(Rc::new(Partial));
        let first = host.install(InstallMode::IfAbsent);
        let installed = Rc::clone(host.provider().unwrap());
        assert_eq!(host.install(InstallMode::Replace), first);
        assert!(Rc::ptr_eq(host.provider().unwrap(), &installed));
    }

    #[test]
    fn contract_through_trait_object() {
        let mut host = Host::new();
        host.install(InstallMode::default());
        let mut m = host
            .new_map(vec![(Value::from("foo"), Value::from("bar")), (Value::from(f64::NAN), Value::from(1))])
            .expect("provider installed");
        assert_eq!(m.size(), 2);
        assert!(m.has(&Value::from(f64::NAN)));
        m.set(Value::from(-0.0), Value::from(0));
        assert_eq!(m.get(&Value::from(0.0)), Value::from(0));
        assert!(m.delete(&Value::from("foo")));
        assert!(m.get(&Value::from("foo")).is_undefined());

        let mut keys = Vec::new();
        m.for_each(&mut |_, k| keys.push(k.clone()));
        assert_eq!(keys, [Value::from(f64::NAN), Value::from(0)]);
    }
}
