//! Built-in templates compiled into the binary.
//!
//! Entries are addressed by forward-slash logical paths (for example
//! `templates/traefik/traefik.yml`) on every host. Project and user-home
//! overrides mirror this layout.

macro_rules! embed {
    ($($path:literal),* $(,)?) => {
        &[$(
            ($path, include_str!(concat!(env!("CARGO_MANIFEST_DIR"), "/assets/", $path))),
        )*]
    };
}

static ASSETS: EmbeddedAssets = EmbeddedAssets {
    entries: embed![
        "templates/docker-compose/common-services/docker-compose.yml",
        "templates/docker-compose/environments/includes/db.base.yml",
        "templates/docker-compose/environments/includes/networks.base.yml",
        "templates/docker-compose/environments/includes/nginx.base.yml",
        "templates/docker-compose/environments/includes/php-fpm.base.yml",
        "templates/docker-compose/environments/includes/php-fpm.darwin.yml",
        "templates/docker-compose/environments/includes/redis.base.yml",
        "templates/docker-compose/environments/local/local.base.yml",
        "templates/docker-compose/environments/magento2/magento2.base.yml",
        "templates/docker-compose/environments/magento2/magento2.darwin.yml",
        "templates/docker-compose/environments/magento2/magento2.mutagen.yml",
        "templates/docker-compose/environments/wordpress/wordpress.base.yml",
        "templates/docker-compose/environments/wordpress/wordpress.mutagen.yml",
        "templates/traefik/traefik.yml",
    ],
};

/// A read-only bundle of named template sources.
#[derive(Debug)]
pub struct EmbeddedAssets {
    entries: &'static [(&'static str, &'static str)],
}

impl EmbeddedAssets {
    /// The bundle shipped with this binary.
    pub fn builtin() -> &'static EmbeddedAssets {
        &ASSETS
    }

    /// A bundle over caller-provided entries.
    pub const fn from_entries(entries: &'static [(&'static str, &'static str)]) -> Self {
        Self { entries }
    }

    /// Content for a logical path. Backslashes are treated as separators.
    pub fn get(&self, path: &str) -> Option<&'static str> {
        let path = logical_path(path);
        self.entries
            .iter()
            .find(|(name, _)| *name == path)
            .map(|(_, content)| *content)
    }

    pub fn contains(&self, path: &str) -> bool {
        self.get(path).is_some()
    }

    /// All logical paths in the bundle.
    pub fn paths(&self) -> impl Iterator<Item = &'static str> + '_ {
        self.entries.iter().map(|(name, _)| *name)
    }
}

/// Normalise a logical template path to forward slashes.
pub fn logical_path(path: &str) -> String {
    path.replace('\\', "/")
}
