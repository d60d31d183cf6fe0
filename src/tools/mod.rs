// src/tools/mod.rs
pub mod mycat;
pub mod mycp;
pub mod myfd;
pub mod myls;
pub mod mymkdir;
pub mod mymv;
pub mod myrm;
pub mod myrmdir;
pub mod mystat;
pub mod mytouch;
pub mod registry;
pub mod types;

use lazy_static::lazy_static;

pub use registry::ToolRegistry;
pub use types::Tool;

lazy_static! {
    static ref REGISTRY: ToolRegistry = {
        let mut registry = ToolRegistry::new();
        registry.register(Box::new(mycat::MyCat));
        registry.register(Box::new(mycp::MyCp));
        registry.register(Box::new(myfd::MyFd));
        registry.register(Box::new(myls::MyLs));
        registry.register(Box::new(mymkdir::MyMkdir));
        registry.register(Box::new(mymv::MyMv));
        registry.register(Box::new(myrm::MyRm));
        registry.register(Box::new(myrmdir::MyRmdir));
        registry.register(Box::new(mystat::MyStat));
        registry.register(Box::new(mytouch::MyTouch));
        registry
    };
}

/// The global bundled-tool registry.
pub fn registry() -> &'static ToolRegistry {
    &REGISTRY
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_registry_contains_all_bundled_tools() {
        let names = registry().names();
        for expected in [
            "mycat", "mycp", "myfd", "myls", "mymkdir", "mymv", "myrm", "myrmdir", "mystat",
            "mytouch",
        ] {
            assert!(names.contains(&expected), "missing tool {}", expected);
        }
    }

    #[test]
    fn test_lookup_by_name() {
        assert!(registry().get("mycat").is_some());
        assert!(registry().get("nosuchtool").is_none());
    }
}
