//! 错误类型定义

use thiserror::Error;

pub type Result<T> = std::result::Result<T, Error>;

#[derive(Error, Debug)]
pub enum Error {
    /// 输入越界、容量为负、预分配引用未知节点等
    #[error("无效输入: {0}")]
    InvalidInput(String),

    /// 求解器内部不变量被破坏，属于实现缺陷而非输入问题
    #[error("流状态不一致: {0}")]
    InconsistentFlowState(String),

    #[error("IO 错误: {0}")]
    IoError(#[from] std::io::Error),

    #[error("序列化错误: {0}")]
    SerializationError(String),
}

impl Error {
    pub(crate) fn invalid(msg: impl Into<String>) -> Self {
        Error::InvalidInput(msg.into())
    }

    pub(crate) fn inconsistent(msg: impl Into<String>) -> Self {
        Error::InconsistentFlowState(msg.into())
    }
}
