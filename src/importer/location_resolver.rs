// ==========================================
// 员工名录服务 - 工作地点解析器实现
// ==========================================
// 职责: 规范化后的 (city, country) → 已存在的 Location
// 红线: 纯查询，不自动创建；city 命中但 country 不符同样失败
// ==========================================

use crate::domain::{fields, City, ClosedSet, Country, FieldErrors, Location};
use crate::i18n::t_with_args;
use crate::importer::employee_importer_trait::LocationResolver as LocationResolverTrait;
use crate::importer::error::{ImportError, ImportResult};
use crate::repository::EmployeeImportSession;
use tracing::debug;

pub struct LocationResolver;

impl LocationResolverTrait for LocationResolver {
    fn resolve(
        &self,
        session: &dyn EmployeeImportSession,
        city: City,
        country: Country,
    ) -> ImportResult<Location> {
        match session.find_location(city.label(), country.label())? {
            Some(location) => {
                debug!(location_id = location.id, city = %city, country = %country, "工作地点已解析");
                Ok(location)
            }
            None => Err(location_not_found(city.label(), country.label())),
        }
    }
}

/// 构造 LocationNotFound（errors 挂在 location 字段下）
pub fn location_not_found(city: &str, country: &str) -> ImportError {
    let message = t_with_args(
        "import.location_not_found",
        &[("city", city), ("country", country)],
    );
    ImportError::LocationNotFound {
        city: city.to_string(),
        country: country.to_string(),
        errors: FieldErrors::single(fields::LOCATION, message),
    }
}
