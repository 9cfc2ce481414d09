use anyhow::Result;
use std::path::PathBuf;

/// 默认候选模型文件，按顺序尝试加载
pub const DEFAULT_MODEL_CANDIDATES: [&str; 3] = [
    "best_model.onnx",
    "best_model_improved.onnx",
    "bestmodel.onnx",
];

#[derive(Debug, Clone)]
pub struct Config {
    /// 服务器绑定地址
    pub bind_addr: String,

    /// 模型文件根目录
    pub model_dir: PathBuf,

    /// 候选模型文件名（相对于 model_dir）
    pub model_candidates: Vec<String>,

    /// 静态资源目录
    pub static_dir: PathBuf,

    /// 工作线程数量
    pub workers: usize,

    /// 开发模式
    pub dev_mode: bool,

    /// ONNX Runtime配置
    pub onnx_config: OnnxConfig,

    /// 服务器配置
    pub server_config: ServerConfig,
}

#[derive(Debug, Clone)]
pub struct OnnxConfig {
    /// CPU线程数
    pub intra_threads: usize,

    /// 优化级别 (0-3)
    pub optimization_level: u8,
}

#[derive(Debug, Clone)]
pub struct ServerConfig {
    /// 请求超时时间（秒）
    pub request_timeout: u64,

    /// 最大请求体大小（字节）
    pub max_request_size: usize,
}

impl Config {
    pub fn new(
        bind_addr: String,
        model_dir: String,
        model_candidates: Vec<String>,
        static_dir: String,
        workers: Option<usize>,
        dev_mode: bool,
    ) -> Result<Self> {
        let cpu_cores = num_cpus::get();
        let workers = workers.unwrap_or(cpu_cores);
        if workers == 0 {
            anyhow::bail!("Worker count must be at least 1");
        }

        let model_candidates = if model_candidates.is_empty() {
            DEFAULT_MODEL_CANDIDATES.iter().map(|s| s.to_string()).collect()
        } else {
            model_candidates
        };

        let onnx_config = OnnxConfig {
            intra_threads: (cpu_cores * 3 / 4).max(1), // 使用75%的CPU核心
            optimization_level: 3,
        };

        let server_config = ServerConfig {
            request_timeout: if dev_mode { 300 } else { 60 },
            max_request_size: 20 * 1024 * 1024, // 20MB
        };

        Ok(Self {
            bind_addr,
            model_dir: PathBuf::from(model_dir),
            model_candidates,
            static_dir: PathBuf::from(static_dir),
            workers,
            dev_mode,
            onnx_config,
            server_config,
        })
    }

    /// 按顺序获取候选模型路径
    pub fn candidate_paths(&self) -> Vec<PathBuf> {
        self.model_candidates
            .iter()
            .map(|name| self.model_dir.join(name))
            .collect()
    }

    /// 首选模型文件名，用于提示信息
    pub fn primary_model_file(&self) -> &str {
        self.model_candidates
            .first()
            .map(String::as_str)
            .unwrap_or(DEFAULT_MODEL_CANDIDATES[0])
    }

    /// 获取首页文件路径
    pub fn index_path(&self) -> PathBuf {
        self.static_dir.join("index.html")
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn config(candidates: Vec<String>) -> Config {
        Config::new(
            "127.0.0.1:0".to_string(),
            "/srv/models".to_string(),
            candidates,
            "static".to_string(),
            Some(2),
            false,
        )
        .unwrap()
    }

    #[test]
    fn default_candidates_keep_order() {
        let config = config(Vec::new());
        let paths = config.candidate_paths();

        assert_eq!(paths.len(), 3);
        assert_eq!(paths[0], PathBuf::from("/srv/models/best_model.onnx"));
        assert_eq!(paths[1], PathBuf::from("/srv/models/best_model_improved.onnx"));
        assert_eq!(paths[2], PathBuf::from("/srv/models/bestmodel.onnx"));
        assert_eq!(config.primary_model_file(), "best_model.onnx");
    }

    #[test]
    fn explicit_candidates_replace_defaults() {
        let config = config(vec!["custom.onnx".to_string()]);
        assert_eq!(config.candidate_paths(), vec![PathBuf::from("/srv/models/custom.onnx")]);
        assert_eq!(config.primary_model_file(), "custom.onnx");
    }

    #[test]
    fn zero_workers_rejected() {
        let result = Config::new(
            "127.0.0.1:0".to_string(),
            ".".to_string(),
            Vec::new(),
            "static".to_string(),
            Some(0),
            false,
        );
        assert!(result.is_err());
    }

    #[test]
    fn dev_mode_extends_timeout() {
        let config = Config::new(
            "127.0.0.1:0".to_string(),
            ".".to_string(),
            Vec::new(),
            "static".to_string(),
            Some(1),
            true,
        )
        .unwrap();
        assert!(config.dev_mode);
        assert_eq!(config.server_config.request_timeout, 300);
        assert_eq!(config.index_path(), PathBuf::from("static/index.html"));
    }
}
