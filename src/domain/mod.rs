// ==========================================
// 员工名录服务 - 领域模型层
// ==========================================
// 职责: 定义领域实体、封闭取值集合、导入中间结构
// 红线: 不含数据访问逻辑
// ==========================================

pub mod employee;
pub mod types;

// 重导出核心类型
pub use employee::{
    fields, ActingManager, BatchResult, CallerIdentity, DecodedRecord, Employee, EmployeeId,
    EmployeeView, FieldErrors, LineError, Location, LocationId, NewEmployee, NormalizedEmployee,
    RawRecord, UserId,
};
pub use types::{City, ClosedSet, Country, Position, Specialization, SEEDED_LOCATIONS};
