//! Default configuration values

/// File name of the releaseman configuration, relative to the working directory
pub const RELEASE_CONFIG_FILE: &str = "release_config.yml";

/// Environment variable holding the next version
pub const ENV_NEW_VERSION: &str = "new_version";

/// Environment variable holding the changelog output path
pub const ENV_CHANGELOG_PATH: &str = "changelog_pth";

/// Environment variable holding the release configuration YAML
pub const ENV_RELEASE_CONFIG: &str = "release_config";

/// Variable the generated changelog is exported under.
///
/// The spelling is what downstream steps already read; do not "fix" it.
pub const DEFAULT_EXPORT_KEY: &str = "BITRSE_CHANGELOG";

/// Name of the changelog tool executable
pub const RELEASEMAN_BIN: &str = "releaseman";

/// Go module path releaseman is installed from
pub const RELEASEMAN_MODULE: &str = "github.com/bitrise-tools/releaseman";

/// Branch checked out before generation when git sync is enabled
pub const DEFAULT_SYNC_BRANCH: &str = "master";

/// Release configuration used when none is supplied
pub const DEFAULT_RELEASE_CONFIG: &str = r#"release:
  development_branch: master
changelog:
  path: CHANGELOG.md
  content_template: |-
    {{range .ContentItems}}### {{.EndTaggedCommit.Tag}} ({{.EndTaggedCommit.Date.Format "2006 Jan 02"}})

    {{range .Commits}}* [{{firstChars .Hash 7}}] {{.Message}}
    {{end}}
    {{end}}
  header_template: '## Changelog (Current version: {{.Version}})'
  footer_template: 'Updated: {{.CurrentDate.Format "2006 Jan 02"}}'"#;
