use std::{
    ffi::{OsStr, OsString},
    fmt,
};

pub const GOOS: &str = "GOOS";
pub const CGO_ENABLED: &str = "CGO_ENABLED";

/// The only operating system operator images are built for.
pub const TARGET_OS: &str = "linux";

/// Environment variables passed to the compiler. Keeps the order in which variables were first
/// inserted and never holds the same name twice.
#[derive(Default, Clone, PartialEq, Eq)]
pub struct CompileEnvironment {
    vars: Vec<(OsString, OsString)>,
}

impl CompileEnvironment {
    pub fn inherit<I, K, V>(vars: I) -> Self
    where
        I: IntoIterator<Item = (K, V)>,
        K: Into<OsString>,
        V: Into<OsString>,
    {
        let mut env = Self::default();
        for (key, value) in vars {
            env.set(key, value);
        }
        env
    }

    /// Starts from `inherited` and cross-compiles for [`TARGET_OS`]. Cgo is disabled unless the
    /// inherited environment says otherwise.
    pub fn for_target<I, K, V>(inherited: I) -> Self
    where
        I: IntoIterator<Item = (K, V)>,
        K: Into<OsString>,
        V: Into<OsString>,
    {
        let mut env = Self::inherit(inherited);
        env.set(GOOS, TARGET_OS);
        env.set_if_absent(CGO_ENABLED, "0");
        env
    }

    pub fn get(&self, key: impl AsRef<OsStr>) -> Option<&OsStr> {
        let key = key.as_ref();
        self.vars
            .iter()
            .find(|(k, _)| k.as_os_str() == key)
            .map(|(_, v)| v.as_os_str())
    }

    /// Sets `key` to `value`, replacing the value in place if `key` is already present.
    pub fn set(&mut self, key: impl Into<OsString>, value: impl Into<OsString>) {
        let key = key.into();
        let value = value.into();
        match self.vars.iter_mut().find(|(k, _)| *k == key) {
            Some((_, existing)) => *existing = value,
            None => self.vars.push((key, value)),
        }
    }

    pub fn set_if_absent(&mut self, key: impl Into<OsString>, value: impl Into<OsString>) {
        let key = key.into();
        if self.get(&key).is_none() {
            self.vars.push((key, value.into()));
        }
    }

    pub fn iter(&self) -> impl Iterator<Item = (&OsStr, &OsStr)> {
        self.vars.iter().map(|(k, v)| (k.as_os_str(), v.as_os_str()))
    }
}

// Values are left out, they may be credentials.
impl fmt::Debug for CompileEnvironment {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_set().entries(self.vars.iter().map(|(k, _)| k)).finish()
    }
}
