// ==========================================
// 员工名录服务 - 导入配置读取 Trait
// ==========================================
// 职责: 定义导入模块所需的配置读取接口（不包含实现）
// 红线: 不包含配置写入、不包含业务逻辑
// ==========================================

use std::error::Error;

// ==========================================
// ImportConfigReader Trait
// ==========================================
// 用途: 导入模块所需的配置读取接口
// 实现者: ConfigManager（从 config_kv 表读取）
pub trait ImportConfigReader: Send + Sync {
    /// 单批最大行数（超出则整批判为解码失败）
    ///
    /// # 默认值
    /// - 10000
    fn get_max_batch_rows(&self) -> Result<usize, Box<dyn Error>>;

    /// CSV 分隔符（单个 ASCII 字节）
    ///
    /// # 默认值
    /// - b','
    fn get_csv_delimiter(&self) -> Result<u8, Box<dyn Error>>;

    /// 消息语言
    ///
    /// # 默认值
    /// - "en"
    fn get_locale(&self) -> Result<String, Box<dyn Error>>;
}
