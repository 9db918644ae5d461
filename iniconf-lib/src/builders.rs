use std::path::PathBuf;

use crate::serializer::NewKeyPolicy;
use crate::store::IniStore;
use crate::IniError;

#[derive(Debug, Default)]
pub struct IniStoreBuilder {
    store: IniStore,
}

impl IniStoreBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn path(mut self, path: impl Into<PathBuf>) -> Self {
        self.store.set_path(path);
        self
    }

    pub fn new_key_policy(mut self, policy: NewKeyPolicy) -> Self {
        self.store.new_key_policy = policy;
        self
    }

    pub fn atomic_save(mut self, atomic_save: bool) -> Self {
        self.store.atomic_save = atomic_save;
        self
    }

    pub fn build(self) -> IniStore {
        self.store
    }

    pub fn open(self) -> Result<IniStore, IniError> {
        let mut store = self.build();
        store.load()?;
        Ok(store)
    }
}
