// ==========================================
// 员工名录服务 - 输入解码器实现
// ==========================================
// 支持: 分隔文本 (.csv，首行为表头) / 对象列表 (.json)
// 输出: 有序的 DecodedRecord 序列（带原始行号）
// 红线: 结构性错误整批失败，不产生部分结果
// ==========================================

use crate::domain::{DecodedRecord, RawRecord};
use crate::importer::error::{ImportError, ImportResult};
use csv::ReaderBuilder;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::fmt;
use std::io::Read;
use std::path::Path;

const UTF8_BOM: char = '\u{feff}';

// ==========================================
// InputEncoding - 输入编码
// ==========================================
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum InputEncoding {
    Csv,
    Json,
}

impl InputEncoding {
    /// 按扩展名识别（忽略大小写）
    pub fn from_extension(ext: &str) -> Option<Self> {
        match ext.to_ascii_lowercase().as_str() {
            "csv" => Some(InputEncoding::Csv),
            "json" => Some(InputEncoding::Json),
            _ => None,
        }
    }

    /// 按文件路径选择编码
    ///
    /// # 返回
    /// - Err(FileNotFound): 文件不存在
    /// - Err(UnsupportedFormat): 扩展名不是 csv/json
    pub fn from_path(path: &Path) -> ImportResult<Self> {
        // 检查文件存在
        if !path.exists() {
            return Err(ImportError::FileNotFound(path.display().to_string()));
        }

        // 检查扩展名
        let ext = path.extension().and_then(|e| e.to_str()).unwrap_or("");
        Self::from_extension(ext).ok_or_else(|| {
            ImportError::UnsupportedFormat(if ext.is_empty() {
                path.display().to_string()
            } else {
                ext.to_string()
            })
        })
    }
}

impl fmt::Display for InputEncoding {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            InputEncoding::Csv => write!(f, "csv"),
            InputEncoding::Json => write!(f, "json"),
        }
    }
}

// ==========================================
// CSV Decoder 实现
// ==========================================
pub struct CsvDecoder {
    delimiter: u8,
}

impl Default for CsvDecoder {
    fn default() -> Self {
        Self { delimiter: b',' }
    }
}

impl CsvDecoder {
    pub fn with_delimiter(delimiter: u8) -> Self {
        Self { delimiter }
    }

    /// 解码 CSV
    ///
    /// 行号取记录起始的物理行（表头为第 1 行）
    pub fn decode<R: Read>(&self, input: R) -> ImportResult<Vec<DecodedRecord>> {
        let mut reader = ReaderBuilder::new()
            .has_headers(true)
            .flexible(false) // 列数与表头不一致视为结构错误
            .delimiter(self.delimiter)
            .from_reader(input);

        // 读取表头
        let headers: Vec<String> = reader
            .headers()?
            .iter()
            .enumerate()
            .map(|(idx, h)| {
                let h = if idx == 0 {
                    h.trim_start_matches(UTF8_BOM)
                } else {
                    h
                };
                h.trim().to_string()
            })
            .collect();

        // 读取所有行
        let mut records = Vec::new();
        for (row_idx, result) in reader.records().enumerate() {
            let record = result?;
            let line = record
                .position()
                .map(|p| p.line() as usize)
                .unwrap_or(row_idx + 2);

            let mut fields = RawRecord::new();
            for (col_idx, value) in record.iter().enumerate() {
                if let Some(header) = headers.get(col_idx) {
                    fields.insert(header.clone(), value.trim().to_string());
                }
            }

            // 跳过完全空白的行
            if fields.values().all(|v| v.is_empty()) {
                continue;
            }

            records.push(DecodedRecord { line, fields });
        }

        Ok(records)
    }
}

// ==========================================
// JSON Decoder 实现
// ==========================================
pub struct JsonDecoder;

impl JsonDecoder {
    /// 解码 JSON 对象列表
    ///
    /// 第 i 个元素（从 0 开始）的行号为 i + 1
    pub fn decode<R: Read>(&self, input: R) -> ImportResult<Vec<DecodedRecord>> {
        let document: Value = serde_json::from_reader(input)?;

        let items = match document {
            Value::Array(items) => items,
            other => {
                return Err(ImportError::Decode(format!(
                    "顶层必须为对象数组，实际为 {}",
                    json_kind(&other)
                )))
            }
        };

        let mut records = Vec::with_capacity(items.len());
        for (idx, item) in items.into_iter().enumerate() {
            let line = idx + 1;
            let object = match item {
                Value::Object(object) => object,
                other => {
                    return Err(ImportError::Decode(format!(
                        "第 {} 个元素必须为对象，实际为 {}",
                        line,
                        json_kind(&other)
                    )))
                }
            };

            let mut fields = RawRecord::new();
            for (key, value) in object {
                let text = match value {
                    Value::Null => continue,
                    Value::String(s) => s,
                    Value::Number(n) => n.to_string(),
                    Value::Bool(b) => b.to_string(),
                    Value::Array(_) | Value::Object(_) => {
                        return Err(ImportError::Decode(format!(
                            "第 {} 个元素的字段 {} 不支持嵌套值",
                            line, key
                        )))
                    }
                };
                fields.insert(key, text);
            }

            records.push(DecodedRecord { line, fields });
        }

        Ok(records)
    }
}

fn json_kind(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "boolean",
        Value::Number(_) => "number",
        Value::String(_) => "string",
        Value::Array(_) => "array",
        Value::Object(_) => "object",
    }
}

/// 按编码解码输入流
pub fn decode_records<R: Read>(
    input: R,
    encoding: InputEncoding,
    csv_delimiter: u8,
) -> ImportResult<Vec<DecodedRecord>> {
    match encoding {
        InputEncoding::Csv => CsvDecoder::with_delimiter(csv_delimiter).decode(input),
        InputEncoding::Json => JsonDecoder.decode(input),
    }
}
