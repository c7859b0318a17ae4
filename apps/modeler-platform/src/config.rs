// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

//! # Platform Configuration
//!
//! Deployment properties are read once at startup and exposed through the
//! immutable [`PlatformProperties`] view. The loader takes every input
//! explicitly (context path, init parameter, properties text, settings
//! lookup) so it never touches ambient process state.
//!
//! ## Environment Variables
//!
//! | Variable | Description | Default |
//! |----------|-------------|---------|
//! | `PLATFORM_PROPERTIES` | Path to the configuration properties file | bundled resource |
//! | `CONTEXT_PATH` | Request-context base path the platform is mounted under | empty |
//! | `SUPPORTED_BROWSER_EDITOR` | Regular expression of user agents the editor supports | unset |
//! | `HOST` | Server bind address | `0.0.0.0` |
//! | `PORT` | Server bind port | `8080` |
//! | `APP_WORKFLOW_HOME` | First home path candidate | unset |
//! | `CONTAINER_LIFERAY_HOME` | Second home path candidate | unset |
//! | `CONTAINER_CATALINA_HOME` | Third home path candidate | unset |
//! | `CONTAINER_JBOSS_HOME_DIR` | Fourth home path candidate | unset |
//! | `LOG_FORMAT` | Logging format (`json` or `pretty`) | `pretty` |
//! | `RUST_LOG` | Log level filter | `info,tower_http=debug` |

use std::collections::HashSet;
use std::path::{Path, MAIN_SEPARATOR};

use regex::Regex;

use crate::error::InitializationError;
use crate::properties::Properties;
use crate::settings::SettingsLookup;

pub const PLATFORM_PROPERTIES_ENV: &str = "PLATFORM_PROPERTIES";
pub const CONTEXT_PATH_ENV: &str = "CONTEXT_PATH";
pub const SUPPORTED_BROWSER_EDITOR_ENV: &str = "SUPPORTED_BROWSER_EDITOR";
pub const HOST_ENV: &str = "HOST";
pub const PORT_ENV: &str = "PORT";

/// Configuration used when `PLATFORM_PROPERTIES` is unset.
pub const BUNDLED_PLATFORM_PROPERTIES: &str =
    include_str!("../resources/configuration.properties");

/// Server name used when the properties do not define `host`.
pub const DEFAULT_SERVER_NAME: &str = "http://localhost:8080/";

/// Settings consulted, in order, for the deployment home path.
pub const HOME_PATH_SETTINGS: [&str; 4] = [
    "app.workflow.home",
    "container.liferay.home",
    "container.catalina.home",
    "container.jboss.home.dir",
];

const REPOSITORY_DIR_NAME: &str = "modeler-repo";
const PLUGINS_DIR_NAME: &str = "osgi-plugins";

/// Property keys of the configuration resource.
mod keys {
    pub const HOST: &str = "host";
    pub const ROOT_DIRECTORY: &str = "fileSystemRootDirectory";
    pub const STEP_EDITOR_URL: &str = "aperteStepEditorUrl";
    pub const QUEUE_EDITOR_URL: &str = "aperteQueueEditorUrl";
    pub const ACTION_EDITOR_URL: &str = "aperteActionEditorUrl";
    pub const STEP_LIST_URL: &str = "aperteStepListUrl";
    pub const BUTTON_LIST_URL: &str = "aperteButtonListUrl";
    pub const OSGI_PLUGINS_DIR: &str = "aperteOsgiPluginsDir";
    pub const JBPM_GUI_URL: &str = "jbpmGuiUrl";
}

/// Read-only platform settings, built once by [`PlatformProperties::load`].
#[derive(Debug, Clone)]
pub struct PlatformProperties {
    server_name: String,
    platform_uri: String,
    explorer_uri: String,
    editor_uri: String,
    libs_uri: String,
    supported_browser_editor: Option<Regex>,
    root_directory_path: String,
    step_editor_url: Option<String>,
    queue_editor_url: Option<String>,
    action_editor_url: Option<String>,
    step_list_url: Option<String>,
    button_list_url: Option<String>,
    osgi_plugins_dir: String,
    jbpm_gui_url: Option<String>,
}

impl PlatformProperties {
    /// Build the configuration from already-read properties text.
    ///
    /// Fails when the properties text is malformed or the supported-browser
    /// pattern does not compile.
    pub fn load(
        context_path: &str,
        supported_browser_editor: Option<&str>,
        properties: &str,
        settings: &dyn SettingsLookup,
    ) -> Result<Self, InitializationError> {
        let props = Properties::parse(properties)?;

        let supported_browser_editor = supported_browser_editor
            .map(|pattern| {
                Regex::new(pattern).map_err(|source| InitializationError::InvalidBrowserPattern {
                    pattern: pattern.to_string(),
                    source,
                })
            })
            .transpose()?;

        let root_directory_path =
            normalize_dir(props.get(keys::ROOT_DIRECTORY)).unwrap_or_else(|| {
                format!("{}{MAIN_SEPARATOR}{REPOSITORY_DIR_NAME}", home_path(settings))
            });
        let osgi_plugins_dir =
            normalize_dir(props.get(keys::OSGI_PLUGINS_DIR)).unwrap_or_else(|| {
                format!("{}{MAIN_SEPARATOR}{PLUGINS_DIR_NAME}", home_path(settings))
            });

        let optional = |key: &str| props.get(key).map(str::to_string);

        Ok(Self {
            server_name: props
                .get(keys::HOST)
                .unwrap_or(DEFAULT_SERVER_NAME)
                .to_string(),
            platform_uri: format!("{context_path}/p"),
            explorer_uri: format!("{context_path}/explorer"),
            editor_uri: format!("{context_path}/editor"),
            libs_uri: format!("{context_path}/libs"),
            supported_browser_editor,
            root_directory_path,
            step_editor_url: optional(keys::STEP_EDITOR_URL),
            queue_editor_url: optional(keys::QUEUE_EDITOR_URL),
            action_editor_url: optional(keys::ACTION_EDITOR_URL),
            step_list_url: optional(keys::STEP_LIST_URL),
            button_list_url: optional(keys::BUTTON_LIST_URL),
            osgi_plugins_dir,
            jbpm_gui_url: optional(keys::JBPM_GUI_URL),
        })
    }

    /// Read the properties resource from disk, then [`load`](Self::load).
    pub fn load_from_path(
        context_path: &str,
        supported_browser_editor: Option<&str>,
        path: impl AsRef<Path>,
        settings: &dyn SettingsLookup,
    ) -> Result<Self, InitializationError> {
        let path = path.as_ref();
        let text = std::fs::read_to_string(path).map_err(|source| {
            InitializationError::ReadProperties {
                path: path.display().to_string(),
                source,
            }
        })?;
        Self::load(context_path, supported_browser_editor, &text, settings)
    }

    /// [`load`](Self::load) the configuration shipped with the binary.
    pub fn load_bundled(
        context_path: &str,
        supported_browser_editor: Option<&str>,
        settings: &dyn SettingsLookup,
    ) -> Result<Self, InitializationError> {
        Self::load(
            context_path,
            supported_browser_editor,
            BUNDLED_PLATFORM_PROPERTIES,
            settings,
        )
    }

    pub fn server_name(&self) -> &str {
        &self.server_name
    }

    pub fn platform_uri(&self) -> &str {
        &self.platform_uri
    }

    pub fn explorer_uri(&self) -> &str {
        &self.explorer_uri
    }

    pub fn editor_uri(&self) -> &str {
        &self.editor_uri
    }

    pub fn libs_uri(&self) -> &str {
        &self.libs_uri
    }

    /// The configured supported-browser regular expression, as given.
    pub fn supported_browser_editor_regexp(&self) -> Option<&str> {
        self.supported_browser_editor.as_ref().map(Regex::as_str)
    }

    /// Whether the editor supports the given user agent. Without a configured
    /// pattern every browser is accepted.
    pub fn is_supported_browser(&self, user_agent: &str) -> bool {
        self.supported_browser_editor
            .as_ref()
            .is_none_or(|re| re.is_match(user_agent))
    }

    /// Always empty; administrators are not configured through this file.
    pub fn admins(&self) -> HashSet<String> {
        HashSet::new()
    }

    pub fn root_directory_path(&self) -> &str {
        &self.root_directory_path
    }

    pub fn step_editor_url(&self) -> Option<&str> {
        self.step_editor_url.as_deref()
    }

    pub fn queue_editor_url(&self) -> Option<&str> {
        self.queue_editor_url.as_deref()
    }

    pub fn action_editor_url(&self) -> Option<&str> {
        self.action_editor_url.as_deref()
    }

    pub fn step_list_url(&self) -> Option<&str> {
        self.step_list_url.as_deref()
    }

    pub fn button_list_url(&self) -> Option<&str> {
        self.button_list_url.as_deref()
    }

    pub fn osgi_plugins_dir(&self) -> &str {
        &self.osgi_plugins_dir
    }

    pub fn jbpm_gui_url(&self) -> Option<&str> {
        self.jbpm_gui_url.as_deref()
    }
}

/// First non-empty home path setting, or an empty string.
pub fn home_path(settings: &dyn SettingsLookup) -> String {
    HOME_PATH_SETTINGS
        .iter()
        .filter_map(|name| settings.get(name))
        .find(|value| !value.is_empty())
        .unwrap_or_default()
}

/// Explicit directory setting with one trailing separator removed.
/// `None` for unset or blank values, so the caller applies its fallback.
fn normalize_dir(value: Option<&str>) -> Option<String> {
    let value = value.filter(|v| !v.trim().is_empty())?;
    Some(
        value
            .strip_suffix(MAIN_SEPARATOR)
            .unwrap_or(value)
            .to_string(),
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;
    use std::io::Write;

    fn settings(pairs: &[(&str, &str)]) -> HashMap<String, String> {
        pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect()
    }

    fn sep(path: &str) -> String {
        path.replace('/', &MAIN_SEPARATOR.to_string())
    }

    #[test]
    fn derives_uris_from_context_path() {
        let props = PlatformProperties::load("/modeler", None, "", &settings(&[])).unwrap();
        assert_eq!(props.platform_uri(), "/modeler/p");
        assert_eq!(props.explorer_uri(), "/modeler/explorer");
        assert_eq!(props.editor_uri(), "/modeler/editor");
        assert_eq!(props.libs_uri(), "/modeler/libs");
    }

    #[test]
    fn server_name_defaults_when_host_missing() {
        let props = PlatformProperties::load("", None, "", &settings(&[])).unwrap();
        assert_eq!(props.server_name(), DEFAULT_SERVER_NAME);

        let props =
            PlatformProperties::load("", None, "host=https://bpm.example/", &settings(&[]))
                .unwrap();
        assert_eq!(props.server_name(), "https://bpm.example/");
    }

    #[test]
    fn strips_exactly_one_trailing_separator() {
        let text = format!(
            "fileSystemRootDirectory={}\naperteOsgiPluginsDir={}\n",
            sep("/srv/repo//").replace('\\', "\\\\"),
            sep("/srv/plugins").replace('\\', "\\\\"),
        );
        let props = PlatformProperties::load("", None, &text, &settings(&[])).unwrap();
        assert_eq!(props.root_directory_path(), sep("/srv/repo/"));
        assert_eq!(props.osgi_plugins_dir(), sep("/srv/plugins"));
    }

    #[test]
    fn bundled_configuration_loads_without_a_file() {
        let env = settings(&[("app.workflow.home", "/home/wf")]);
        let props = PlatformProperties::load_bundled("/modeler", None, &env).unwrap();
        assert_eq!(props.server_name(), DEFAULT_SERVER_NAME);
        assert_eq!(props.platform_uri(), "/modeler/p");
        assert_eq!(
            props.root_directory_path(),
            format!("/home/wf{MAIN_SEPARATOR}modeler-repo")
        );
    }

    #[test]
    fn blank_directories_fall_back_to_home_path() {
        let env = settings(&[("container.catalina.home", "/opt/tomcat")]);
        let props =
            PlatformProperties::load("", None, "fileSystemRootDirectory=   \n", &env).unwrap();
        assert_eq!(
            props.root_directory_path(),
            format!("/opt/tomcat{MAIN_SEPARATOR}modeler-repo")
        );
        assert_eq!(
            props.osgi_plugins_dir(),
            format!("/opt/tomcat{MAIN_SEPARATOR}osgi-plugins")
        );
    }

    #[test]
    fn fallbacks_are_independent_of_explicit_values() {
        let env = settings(&[("app.workflow.home", "/home/wf")]);
        let text = "fileSystemRootDirectory=/data/repo\n";
        let props = PlatformProperties::load("", None, text, &env).unwrap();
        assert_eq!(props.root_directory_path(), "/data/repo");
        assert_eq!(
            props.osgi_plugins_dir(),
            format!("/home/wf{MAIN_SEPARATOR}osgi-plugins")
        );
    }

    #[test]
    fn home_path_takes_first_non_empty_setting() {
        assert_eq!(home_path(&settings(&[])), "");
        assert_eq!(
            home_path(&settings(&[
                ("app.workflow.home", ""),
                ("container.liferay.home", "/liferay"),
                ("container.jboss.home.dir", "/jboss"),
            ])),
            "/liferay"
        );
        assert_eq!(
            home_path(&settings(&[("container.jboss.home.dir", "/jboss")])),
            "/jboss"
        );
    }

    #[test]
    fn missing_home_path_yields_relative_fallback() {
        let props = PlatformProperties::load("", None, "", &settings(&[])).unwrap();
        assert_eq!(
            props.root_directory_path(),
            format!("{MAIN_SEPARATOR}modeler-repo")
        );
    }

    #[test]
    fn feature_urls_are_optional() {
        let props = PlatformProperties::load(
            "",
            None,
            "aperteStepEditorUrl=/step\njbpmGuiUrl=http://jbpm/\n",
            &settings(&[]),
        )
        .unwrap();
        assert_eq!(props.step_editor_url(), Some("/step"));
        assert_eq!(props.jbpm_gui_url(), Some("http://jbpm/"));
        assert_eq!(props.queue_editor_url(), None);
        assert_eq!(props.action_editor_url(), None);
        assert_eq!(props.step_list_url(), None);
        assert_eq!(props.button_list_url(), None);
    }

    #[test]
    fn admins_is_always_empty() {
        let props = PlatformProperties::load("", None, "", &settings(&[])).unwrap();
        assert!(props.admins().is_empty());
    }

    #[test]
    fn browser_pattern_matches_user_agents() {
        let props =
            PlatformProperties::load("", Some("Firefox|Chrome"), "", &settings(&[])).unwrap();
        assert_eq!(props.supported_browser_editor_regexp(), Some("Firefox|Chrome"));
        assert!(props.is_supported_browser("Mozilla/5.0 Firefox/128.0"));
        assert!(!props.is_supported_browser("MSIE 6.0"));

        let open = PlatformProperties::load("", None, "", &settings(&[])).unwrap();
        assert!(open.is_supported_browser("anything"));
    }

    #[test]
    fn invalid_browser_pattern_is_fatal() {
        let err = PlatformProperties::load("", Some("(unclosed"), "", &settings(&[])).unwrap_err();
        assert!(matches!(err, InitializationError::InvalidBrowserPattern { .. }));
    }

    #[test]
    fn unreadable_properties_file_is_fatal() {
        let dir = tempfile::tempdir().unwrap();
        let missing = dir.path().join("configuration.properties");
        let err = PlatformProperties::load_from_path("", None, &missing, &settings(&[]))
            .unwrap_err();
        assert!(matches!(err, InitializationError::ReadProperties { .. }));
    }

    #[test]
    fn loads_properties_from_disk() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        writeln!(file, "host=http://disk.example/").unwrap();
        let props =
            PlatformProperties::load_from_path("/ctx", None, file.path(), &settings(&[])).unwrap();
        assert_eq!(props.server_name(), "http://disk.example/");
        assert_eq!(props.platform_uri(), "/ctx/p");
    }
}
