use std::env;
use std::fs;
use std::io;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use log::debug;
use serde::Deserialize;

use crate::locale::Lang;

/// 日報ディレクトリを指定する環境変数。
const DIR_ENV: &str = "DAILYREPORT_DIR";
/// 言語を指定する環境変数。
const LANG_ENV: &str = "DAILYREPORT_LANG";

/// 設定ファイルの内容。すべての項目を省略できる。
#[derive(Debug, Default, Deserialize, PartialEq)]
#[serde(deny_unknown_fields)]
struct ConfigFile {
    dir: Option<PathBuf>,
    lang: Option<Lang>,
}

/// 実行時の設定。
///
/// 既定値、設定ファイル、環境変数、コマンドライン引数の順に上書きする。
#[derive(Debug, PartialEq)]
pub struct Config {
    pub dir: PathBuf,
    pub lang: Lang,
}

impl Config {
    /// 設定を読み込む。
    ///
    /// # Arguments
    ///
    /// * `dir` - コマンドラインで指定された日報ディレクトリ
    /// * `lang` - コマンドラインで指定された言語
    pub fn load(dir: Option<PathBuf>, lang: Option<Lang>) -> Result<Self> {
        let file = match config_path() {
            Some(path) => read_config_file(&path)?,
            None => ConfigFile::default(),
        };
        let env_lang = env::var(LANG_ENV)
            .ok()
            .map(|value| value.parse::<Lang>())
            .transpose()
            .with_context(|| format!("Invalid {}", LANG_ENV))?;
        let env_dir = env::var_os(DIR_ENV).map(PathBuf::from);

        let config = resolve(file, env_dir, env_lang, dir, lang);
        debug!("Loaded config: {:?}", config);

        Ok(config)
    }
}

/// 後に指定されたものを優先して設定を決める。
fn resolve(
    file: ConfigFile,
    env_dir: Option<PathBuf>,
    env_lang: Option<Lang>,
    cli_dir: Option<PathBuf>,
    cli_lang: Option<Lang>,
) -> Config {
    Config {
        dir: cli_dir
            .or(env_dir)
            .or(file.dir)
            .unwrap_or_else(|| PathBuf::from(".")),
        lang: cli_lang.or(env_lang).or(file.lang).unwrap_or_default(),
    }
}

/// 設定ファイルのパス。`~/.config/dailyreport/config.json`など。
fn config_path() -> Option<PathBuf> {
    dirs::config_dir().map(|dir| dir.join("dailyreport").join("config.json"))
}

/// 設定ファイルを読み込む。ファイルがない場合は空の設定とする。
fn read_config_file(path: &Path) -> Result<ConfigFile> {
    let text = match fs::read_to_string(path) {
        Ok(text) => text,
        Err(error) if error.kind() == io::ErrorKind::NotFound => return Ok(ConfigFile::default()),
        Err(error) => {
            return Err(error).with_context(|| format!("Failed to read {}", path.display()))
        }
    };

    serde_json::from_str(&text).with_context(|| format!("Failed to parse {}", path.display()))
}
