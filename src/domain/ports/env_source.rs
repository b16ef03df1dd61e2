//! EnvSource port - read access to process environment variables

pub trait EnvSource {
    /// Value of `key`; unset and empty are both `None`
    fn var(&self, key: &str) -> Option<String>;
}
