use crate::config::types::{DEFAULT_DATABASE, DEFAULT_DESTINATION};
use clap::{ArgGroup, Parser};
use std::path::PathBuf;

/// 以片頭畫面特徵資料庫偵測並剪除影片片頭
///
/// 範例:
///   intro_trimmer -a -d clips.db -i ./video.mp4 -t 30
///   intro_trimmer -b -d clips.db -i ./samples
///   intro_trimmer -c -m -d clips.db -i ./in -o ./out -e "mp4 mkv avi"
#[derive(Parser, Debug)]
#[command(name = "intro_trimmer", version, about, verbatim_doc_comment)]
#[command(group(ArgGroup::new("mode").required(true).args(["add", "build", "cut"])))]
pub struct Cli {
    /// 將樣本影片前 N 秒加入特徵資料庫（需搭配 -t）
    #[arg(short = 'a', long)]
    pub add: bool,

    /// 以樣本影片完整建立特徵資料庫
    #[arg(short = 'b', long)]
    pub build: bool,

    /// 剪除影片片頭
    #[arg(short = 'c', long)]
    pub cut: bool,

    /// 特徵資料庫檔名
    #[arg(short = 'd', long = "db", default_value = DEFAULT_DATABASE)]
    pub database: PathBuf,

    /// 來源影片檔或資料夾，可重複指定
    #[arg(short = 'i', long = "in", value_name = "PATH")]
    pub inputs: Vec<PathBuf>,

    /// 輸出資料夾
    #[arg(short = 'o', long = "out", default_value = DEFAULT_DESTINATION)]
    pub output: PathBuf,

    /// 影片副檔名，例如 "mp4 mkv"
    #[arg(short = 'e', long = "ext")]
    pub extensions: Option<String>,

    /// 剪完後以結果取代原始檔
    #[arg(short = 'm', long = "move")]
    pub move_after_cut: bool,

    /// 同步寫入的日誌檔
    #[arg(short = 'l', long = "log")]
    pub log_file: Option<PathBuf>,

    /// 取樣秒數（append 模式）
    #[arg(short = 't', long = "time", allow_negative_numbers = true)]
    pub time: Option<i64>,

    /// 畫面相似度 (0.0 - 1.0)
    #[arg(long)]
    pub similarity: Option<f64>,

    /// 片頭最長秒數
    #[arg(long = "max-header-secs")]
    pub max_header_secs: Option<u64>,

    /// 偵測參數設定檔（JSON）
    #[arg(long)]
    pub settings: Option<PathBuf>,
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::CommandFactory;

    #[test]
    fn test_cli_definition() {
        Cli::command().debug_assert();
    }

    #[test]
    fn test_parse_cut_mode() {
        let cli = Cli::try_parse_from([
            "intro_trimmer", "-c", "-m", "-d", "x.db", "-i", "a", "-i", "b", "-o", "dst", "-e",
            "mp4 mkv",
        ])
        .unwrap();

        assert!(cli.cut && cli.move_after_cut);
        assert_eq!(cli.database, PathBuf::from("x.db"));
        assert_eq!(cli.inputs, vec![PathBuf::from("a"), PathBuf::from("b")]);
        assert_eq!(cli.extensions.as_deref(), Some("mp4 mkv"));
    }

    #[test]
    fn test_mode_is_required_and_exclusive() {
        assert!(Cli::try_parse_from(["intro_trimmer", "-i", "a"]).is_err());
        assert!(Cli::try_parse_from(["intro_trimmer", "-b", "-c"]).is_err());
    }

    #[test]
    fn test_defaults() {
        let cli = Cli::try_parse_from(["intro_trimmer", "-b"]).unwrap();
        assert_eq!(cli.database, PathBuf::from(DEFAULT_DATABASE));
        assert_eq!(cli.output, PathBuf::from(DEFAULT_DESTINATION));
        assert!(cli.inputs.is_empty());
        assert!(cli.time.is_none());
    }
}
