//! 错误类型

use thiserror::Error;

use crate::option::ProxyType;

/// 解析、构造适配器以及 DNS 解析过程中可能出现的错误
#[derive(Error, Debug)]
pub enum Error {
    /// 输入为空
    #[error("empty input")]
    EmptyInput,

    /// 不支持的链接协议或代理类型
    #[error("unsupported type: {0}")]
    UnsupportedType(String),

    /// 链接格式错误
    #[error("invalid link: {0}")]
    ParseLink(String),

    /// 配置 map 缺少 type 字段
    #[error("missing proxy type")]
    MissingType,

    /// 选项类型与拨号器类型不一致
    #[error("invalid option type: dialer is {expected}, option is {actual}")]
    InvalidOptionType {
        expected: ProxyType,
        actual: ProxyType,
    },

    /// 不支持的协议 (无传输实现或未知的 DNS 上游)
    #[error("unsupported protocol: {0}")]
    UnsupportedProtocol(String),

    /// 选项内容不合法
    #[error("invalid option: {0}")]
    InvalidOption(String),

    /// 所有上游都没有返回地址
    #[error("empty response")]
    EmptyResponse,

    /// DNS 报文或上游错误
    #[error("DNS error: {0}")]
    Dns(String),

    /// 拨号失败
    #[error("dial error: {0}")]
    Dial(String),

    /// 操作超时
    #[error("{0} timed out")]
    Timeout(&'static str),

    /// 字段解码错误
    #[error("decode error: {0}")]
    Decode(#[from] serde_json::Error),

    /// YAML 解析错误
    #[error("YAML error: {0}")]
    Yaml(#[from] serde_yaml::Error),

    /// I/O 错误
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

impl Error {
    pub(crate) fn parse_link<S: Into<String>>(msg: S) -> Self {
        Error::ParseLink(msg.into())
    }

    pub(crate) fn dns<E: std::fmt::Display>(e: E) -> Self {
        Error::Dns(e.to_string())
    }
}

impl From<hickory_proto::error::ProtoError> for Error {
    fn from(e: hickory_proto::error::ProtoError) -> Self {
        Error::Dns(e.to_string())
    }
}

pub type Result<T> = std::result::Result<T, Error>;
