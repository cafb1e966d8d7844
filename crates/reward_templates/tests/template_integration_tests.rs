//! Integration tests for template resolution and compose assembly.

use std::fs;
use std::path::Path;

use serde_yaml::Value;
use tempfile::{tempdir, TempDir};

use reward_core::{AppPaths, HostOs, Settings};
use reward_templates::{
    convert_templates_to_compose_config, ComposeConfigDetails, ConfigGenerator, DynamicConfig,
    EnvironmentSelector, TemplateError, TemplateRenderer, TemplateResolver,
};

const ENVS: &str = "templates/docker-compose/environments";

/// Project directory and application home, both temporary.
struct Workspace {
    project: TempDir,
    home: TempDir,
    paths: AppPaths,
}

impl Workspace {
    fn new() -> Self {
        let project = tempdir().unwrap();
        let home = tempdir().unwrap();
        let paths = AppPaths::new("reward", project.path(), home.path());
        Self {
            project,
            home,
            paths,
        }
    }

    fn project_override(&self, logical: &str, content: &str) {
        write_file(&self.project.path().join(".reward").join(logical), content);
    }

    fn home_override(&self, logical: &str, content: &str) {
        write_file(&self.home.path().join(logical), content);
    }

    fn settings(&self) -> Settings {
        Settings::with_defaults(&self.paths)
    }

    fn assemble(
        &self,
        os: HostOs,
        env_type: &str,
        partials: &[&str],
        settings: &Settings,
    ) -> Result<ComposeConfigDetails, TemplateError> {
        let renderer = TemplateRenderer::new();
        let resolver = TemplateResolver::new(&self.paths);
        let selector = EnvironmentSelector::for_os(&resolver, os);

        let mut set = renderer.new_set();
        for partial in partials {
            selector.append_environment_templates(&mut set, partial, env_type)?;
        }
        convert_templates_to_compose_config(&renderer, &set, settings)
    }
}

fn write_file(path: &Path, content: &str) {
    fs::create_dir_all(path.parent().unwrap()).unwrap();
    fs::write(path, content).unwrap();
}

fn document(details: &ComposeConfigDetails, filename: &str) -> Value {
    let file = details
        .config_files
        .iter()
        .find(|file| file.filename == filename)
        .unwrap_or_else(|| panic!("no document named {}", filename));
    Value::Mapping(file.config.clone())
}

#[test]
fn test_magento2_environment_assembly_order() {
    let ws = Workspace::new();

    let details = ws
        .assemble(
            HostOs::Linux,
            "magento2",
            &["networks", "php-fpm", "nginx", "db", "magento2"],
            &ws.settings(),
        )
        .unwrap();

    let names: Vec<&str> = details.filenames().collect();
    assert_eq!(
        names,
        vec![
            format!("{ENVS}/includes/networks.base.yml"),
            format!("{ENVS}/includes/php-fpm.base.yml"),
            format!("{ENVS}/includes/nginx.base.yml"),
            format!("{ENVS}/includes/db.base.yml"),
            format!("{ENVS}/magento2/magento2.base.yml"),
        ]
    );

    let php = document(&details, &format!("{ENVS}/includes/php-fpm.base.yml"));
    assert_eq!(
        php["services"]["php-fpm"]["image"].as_str(),
        Some("docker.io/rewardenv/php-fpm:8.2")
    );
    assert!(php["services"]["php-debug"].is_null());

    let networks = document(&details, &format!("{ENVS}/includes/networks.base.yml"));
    assert_eq!(networks["networks"]["default"]["name"].as_str(), Some("app_default"));
}

#[test]
fn test_os_specific_fragment_follows_base() {
    let ws = Workspace::new();

    let details = ws
        .assemble(HostOs::Darwin, "magento2", &["php-fpm"], &ws.settings())
        .unwrap();

    let names: Vec<&str> = details.filenames().collect();
    assert_eq!(
        names,
        vec![
            format!("{ENVS}/includes/php-fpm.base.yml"),
            format!("{ENVS}/includes/php-fpm.darwin.yml"),
        ]
    );
}

#[test]
fn test_project_override_wins_over_embedded() {
    let ws = Workspace::new();
    ws.project_override(
        &format!("{ENVS}/includes/php-fpm.base.yml"),
        "services:\n  php-fpm:\n    image: custom/php:{{ reward_php_version }}\n",
    );

    let mut settings = ws.settings();
    settings.set("reward_php_version", "8.3").unwrap();
    let details = ws
        .assemble(HostOs::Linux, "magento2", &["php-fpm"], &settings)
        .unwrap();

    assert_eq!(details.len(), 1);
    let php = document(&details, &format!("{ENVS}/includes/php-fpm.base.yml"));
    assert_eq!(php["services"]["php-fpm"]["image"].as_str(), Some("custom/php:8.3"));
}

#[test]
fn test_project_override_wins_over_home_override() {
    let ws = Workspace::new();
    let logical = format!("{ENVS}/includes/nginx.base.yml");
    ws.home_override(&logical, "services:\n  nginx:\n    image: home\n");
    ws.project_override(&logical, "services:\n  nginx:\n    image: project\n");

    let details = ws
        .assemble(HostOs::Linux, "magento2", &["nginx"], &ws.settings())
        .unwrap();

    let nginx = document(&details, &logical);
    assert_eq!(nginx["services"]["nginx"]["image"].as_str(), Some("project"));
}

#[test]
fn test_local_fragments_precede_embedded_fragments() {
    let ws = Workspace::new();
    ws.project_override(
        &format!("{ENVS}/includes/php-fpm.darwin.yml"),
        "services:\n  php-fpm:\n    user: www-data\n",
    );

    let details = ws
        .assemble(HostOs::Darwin, "magento2", &["php-fpm"], &ws.settings())
        .unwrap();

    let names: Vec<&str> = details.filenames().collect();
    assert_eq!(
        names,
        vec![
            format!("{ENVS}/includes/php-fpm.darwin.yml"),
            format!("{ENVS}/includes/php-fpm.base.yml"),
        ]
    );
    let os_doc = document(&details, &format!("{ENVS}/includes/php-fpm.darwin.yml"));
    assert_eq!(os_doc["services"]["php-fpm"]["user"].as_str(), Some("www-data"));
}

#[test]
fn test_home_override_of_new_fragment_is_included() {
    let ws = Workspace::new();
    ws.home_override(
        &format!("{ENVS}/magento2/php-fpm.linux.yml"),
        "services:\n  php-fpm:\n    user: www-data\n",
    );

    let details = ws
        .assemble(HostOs::Linux, "magento2", &["php-fpm"], &ws.settings())
        .unwrap();

    let names: Vec<&str> = details.filenames().collect();
    assert_eq!(
        names,
        vec![
            format!("{ENVS}/magento2/php-fpm.linux.yml"),
            format!("{ENVS}/includes/php-fpm.base.yml"),
        ]
    );
}

#[test]
fn test_repeated_partial_is_not_duplicated() {
    let ws = Workspace::new();

    let details = ws
        .assemble(
            HostOs::Linux,
            "magento2",
            &["networks", "php-fpm", "networks"],
            &ws.settings(),
        )
        .unwrap();

    assert_eq!(details.len(), 2);
}

#[test]
fn test_missing_partial_is_not_an_error() {
    let ws = Workspace::new();

    let details = ws
        .assemble(HostOs::Linux, "local", &["does-not-exist"], &ws.settings())
        .unwrap();

    assert!(details.is_empty());
}

#[test]
fn test_settings_toggle_optional_services() {
    let ws = Workspace::new();
    let mut settings = ws.settings();
    settings.set("reward_xdebug", "1").unwrap();
    settings
        .set("reward_redis_limits", "cpus=0.5,memory=512m,bogus")
        .unwrap();

    let details = ws
        .assemble(HostOs::Linux, "magento2", &["php-fpm", "redis"], &settings)
        .unwrap();

    let php = document(&details, &format!("{ENVS}/includes/php-fpm.base.yml"));
    assert_eq!(
        php["services"]["php-debug"]["image"].as_str(),
        Some("docker.io/rewardenv/php-fpm:8.2-debug")
    );

    let redis = document(&details, &format!("{ENVS}/includes/redis.base.yml"));
    let limits = &redis["services"]["redis"]["deploy"]["resources"]["limits"];
    assert_eq!(limits["cpus"].as_str(), Some("0.5"));
    assert_eq!(limits["memory"].as_str(), Some("512m"));
    assert!(limits["bogus"].is_null());
}

#[test]
fn test_render_failure_aborts_whole_assembly() {
    let ws = Workspace::new();
    ws.project_override(
        &format!("{ENVS}/includes/nginx.base.yml"),
        "services:\n  nginx:\n    image: {{ nosuchfn() }}\n",
    );

    let result = ws.assemble(
        HostOs::Linux,
        "magento2",
        &["networks", "nginx", "db"],
        &ws.settings(),
    );

    match result {
        Err(TemplateError::Render { name, .. }) => {
            assert_eq!(name, format!("{ENVS}/includes/nginx.base.yml"))
        }
        other => panic!("expected render failure, got {other:?}"),
    }
}

#[test]
fn test_invalid_override_syntax_is_parse_error() {
    let ws = Workspace::new();
    ws.project_override(&format!("{ENVS}/includes/db.base.yml"), "{% for %}\n");

    let result = ws.assemble(HostOs::Linux, "magento2", &["db"], &ws.settings());

    assert!(matches!(result, Err(TemplateError::Parse { .. })));
}

#[test]
fn test_rendered_output_must_be_yaml_mapping() {
    let ws = Workspace::new();
    ws.project_override(&format!("{ENVS}/local/web.base.yml"), "- just\n- a list\n");

    let result = ws.assemble(HostOs::Linux, "local", &["web"], &ws.settings());

    assert!(matches!(
        result,
        Err(TemplateError::InvalidComposeDocument { kind: "sequence", .. })
    ));
}

#[test]
fn test_common_services_stack() {
    let ws = Workspace::new();
    let renderer = TemplateRenderer::new();
    let resolver = TemplateResolver::new(&ws.paths);
    let selector = EnvironmentSelector::for_os(&resolver, HostOs::Linux);

    let mut set = renderer.new_set();
    selector.append_common_services(&mut set).unwrap();
    let mut settings = ws.settings();
    settings.set("reward_mailbox", false).unwrap();

    let details = convert_templates_to_compose_config(&renderer, &set, &settings).unwrap();

    assert_eq!(details.len(), 1);
    let doc = Value::Mapping(details.config_files[0].config.clone());
    assert!(doc["services"]["traefik"].is_mapping());
    assert!(doc["services"]["dnsmasq"].is_mapping());
    assert!(doc["services"]["mailbox"].is_null());
    assert_eq!(doc["networks"]["default"]["name"].as_str(), Some("reward"));

    let volumes = doc["services"]["traefik"]["volumes"].as_sequence().unwrap();
    let expected = format!("{}/ssl/certs:/etc/ssl/certs", ws.home.path().display());
    assert!(volumes.iter().any(|v| v.as_str() == Some(expected.as_str())));
}

#[test]
fn test_mutagen_config_is_written_once() {
    let ws = Workspace::new();
    let generator = ConfigGenerator::new(&ws.paths, TemplateRenderer::new()).with_os(HostOs::Darwin);
    let target = ws.project.path().join(".reward").join("mutagen.yml");

    assert!(generator
        .generate_mutagen_config(&target, "magento2", &ws.settings())
        .unwrap());
    let first = fs::read_to_string(&target).unwrap();
    let modified = fs::metadata(&target).unwrap().modified().unwrap();
    assert!(first.contains("two-way-resolved"));

    assert!(!generator
        .generate_mutagen_config(&target, "wordpress", &ws.settings())
        .unwrap());
    assert_eq!(fs::read_to_string(&target).unwrap(), first);
    assert_eq!(fs::metadata(&target).unwrap().modified().unwrap(), modified);

    #[cfg(unix)]
    {
        use std::os::unix::fs::PermissionsExt;
        let mode = fs::metadata(&target).unwrap().permissions().mode();
        assert_eq!(mode & 0o777, 0o640);
    }
}

#[test]
fn test_traefik_static_config_is_regenerated() {
    let ws = Workspace::new();
    let generator = ConfigGenerator::new(&ws.paths, TemplateRenderer::new());
    let target = ws.home.path().join("etc/traefik/traefik.yml");
    write_file(&target, "stale: true\n");

    let written = generator.generate_traefik_config(&ws.settings()).unwrap();

    assert_eq!(written, target);
    let doc: Value = serde_yaml::from_str(&fs::read_to_string(&target).unwrap()).unwrap();
    assert!(doc["stale"].is_null());
    assert_eq!(doc["providers"]["docker"]["network"].as_str(), Some("reward"));
    assert_eq!(
        doc["entryPoints"]["http"]["http"]["redirections"]["entryPoint"]["to"].as_str(),
        Some("https")
    );
}

#[test]
fn test_mutagen_config_ignores_local_overrides() {
    let ws = Workspace::new();
    let logical = format!("{ENVS}/magento2/magento2.mutagen.yml");
    ws.project_override(&logical, "sync: project\n");
    ws.home_override(&logical, "sync: home\n");
    let generator = ConfigGenerator::new(&ws.paths, TemplateRenderer::new()).with_os(HostOs::Linux);
    let target = ws.project.path().join("mutagen.yml");

    assert!(generator
        .generate_mutagen_config(&target, "magento2", &ws.settings())
        .unwrap());

    let written = fs::read_to_string(&target).unwrap();
    assert!(written.contains("two-way-resolved"));
    assert!(!written.contains("project"));
    assert!(!written.contains("home"));
}

#[test]
fn test_traefik_static_config_ignores_local_overrides() {
    let ws = Workspace::new();
    ws.project_override("templates/traefik/traefik.yml", "log: project\n");
    ws.home_override("templates/traefik/traefik.yml", "log: home\n");
    let generator = ConfigGenerator::new(&ws.paths, TemplateRenderer::new());

    let target = generator.generate_traefik_config(&ws.settings()).unwrap();

    let doc: Value = serde_yaml::from_str(&fs::read_to_string(&target).unwrap()).unwrap();
    assert_eq!(doc["log"]["level"].as_str(), Some("info"));
    assert_eq!(doc["providers"]["docker"]["network"].as_str(), Some("reward"));
}

#[test]
fn test_traefik_dynamic_config_without_certificates() {
    let ws = Workspace::new();
    let generator = ConfigGenerator::new(&ws.paths, TemplateRenderer::new());

    let target = generator.generate_traefik_dynamic_config("reward.test").unwrap();

    let config: DynamicConfig = serde_yaml::from_str(&fs::read_to_string(target).unwrap()).unwrap();
    assert!(config.tls.certificates.is_empty());
    assert_eq!(
        config.tls.stores.default.default_certificate.cert_file,
        "/etc/ssl/certs/reward.test.crt.pem"
    );
}

#[test]
fn test_traefik_dynamic_config_lists_certificates() {
    let ws = Workspace::new();
    let certs = ws.home.path().join("ssl/certs");
    write_file(&certs.join("shop.crt.pem"), "cert");
    write_file(&certs.join("shop.key.pem"), "key");
    let generator = ConfigGenerator::new(&ws.paths, TemplateRenderer::new());

    let target = generator.generate_traefik_dynamic_config("reward.test").unwrap();

    let config: DynamicConfig = serde_yaml::from_str(&fs::read_to_string(target).unwrap()).unwrap();
    assert_eq!(config.tls.certificates.len(), 1);
    assert_eq!(config.tls.certificates[0].cert_file, "/etc/ssl/certs/shop.crt.pem");
    assert_eq!(config.tls.certificates[0].key_file, "/etc/ssl/certs/shop.key.pem");
}
