// ==========================================
// 员工导入集成测试
// ==========================================
// 测试范围: 单条创建 / CSV 与 JSON 整批导入 / 文件导入
// 数据库: 临时文件库（独立连接）
// ==========================================


use employee_directory::domain::{fields, ActingManager, City, Country, Position, Specialization};
use employee_directory::importer::{EmployeeImporter, ImportError, InputEncoding};
use employee_directory::logging;
use employee_directory::repository::EmployeeRepository;
use test_helpers::*;

// ==========================================
// 单条创建
// ==========================================

#[test]
fn test_import_one_normalizes_and_persists() {
    logging::init_test();
    let (_temp_file, db_path) = create_test_db().expect("创建测试数据库失败");
    let importer = create_importer(&db_path).expect("创建导入器失败");

    let raw = record(&[
        ("full_name", "Иван Иванов"),
        ("position", "менеджер"),
        ("specialization", "python"),
        ("city", "москва"),
        ("country", "россия"),
        ("telegram_nick", "@ivanov"),
    ]);

    let employee = importer.import_one(&raw, None).expect("单条导入失败");
    println!("✓ 步骤 1: 单条导入成功, id={}", employee.id);

    assert_eq!(employee.full_name, "Иван Иванов");
    assert_eq!(employee.position, Position::Manager);
    assert_eq!(employee.specialization, Specialization::Python);
    assert_eq!(employee.location.city, City::Moscow.to_string());
    assert_eq!(employee.location.country, Country::Russia.to_string());
    assert_eq!(employee.telegram_nick.as_deref(), Some("@ivanov"));
    assert_eq!(employee.about, None);
    assert_eq!(employee.manager_id, None);

    let stored = EmployeeRepository::new(&db_path)
        .unwrap()
        .find_view_by_id(employee.id)
        .unwrap()
        .expect("员工未落库");
    assert_eq!(stored.location_full, "Москва, Россия");
    assert_eq!(stored.manager_full_name, None);
    println!("✓ 步骤 2: 落库数据与返回值一致");
}

#[test]
fn test_import_one_location_pair_mismatch() {
    logging::init_test();
    let (_temp_file, db_path) = create_test_db().unwrap();
    let importer = create_importer(&db_path).unwrap();

    // 两个值都在各自的封闭集合中，但组合不存在
    let raw = record(&[
        ("full_name", "Пьер"),
        ("position", "junior-разработчик"),
        ("specialization", "devops"),
        ("city", "Париж"),
        ("country", "Россия"),
    ]);

    match importer.import_one(&raw, None) {
        Err(ImportError::LocationNotFound { errors, .. }) => {
            assert!(errors.contains(fields::LOCATION));
        }
        other => panic!("期望 LocationNotFound, 实际: {:?}", other),
    }
    assert_eq!(count_employees(&db_path).unwrap(), 0);
}

#[test]
fn test_import_one_out_of_set_city() {
    logging::init_test();
    let (_temp_file, db_path) = create_test_db().unwrap();
    let importer = create_importer(&db_path).unwrap();

    let mut raw = valid_record("John Smith");
    raw.insert("city".to_string(), "Лондон".to_string());
    raw.insert("country".to_string(), "Россия".to_string());

    let err = importer.import_one(&raw, None).unwrap_err();
    assert!(matches!(err, ImportError::LocationNotFound { .. }));
    assert!(err.into_field_errors().contains(fields::CITY));
    assert_eq!(count_employees(&db_path).unwrap(), 0);
}

#[test]
fn test_import_one_out_of_set_city_with_other_errors() {
    logging::init_test();
    let (_temp_file, db_path) = create_test_db().unwrap();
    let importer = create_importer(&db_path).unwrap();

    let mut raw = valid_record(" ");
    raw.insert("city".to_string(), "Лондон".to_string());

    match importer.import_one(&raw, None) {
        Err(ImportError::LocationNotFound { errors, .. }) => {
            assert!(errors.contains(fields::CITY));
            assert!(errors.contains(fields::FULL_NAME));
        }
        other => panic!("期望 LocationNotFound, 实际: {:?}", other),
    }
    assert_eq!(count_employees(&db_path).unwrap(), 0);
}

#[test]
fn test_import_one_unseeded_database_reports_location() {
    logging::init_test();
    let (_temp_file, db_path) = create_empty_test_db().unwrap();
    let importer = create_importer(&db_path).unwrap();

    let err = importer
        .import_one(&valid_record("Иван Иванов"), None)
        .unwrap_err();
    assert!(matches!(err, ImportError::LocationNotFound { .. }));
    assert_eq!(count_employees(&db_path).unwrap(), 0);
}

#[test]
fn test_import_one_assigns_acting_manager() {
    logging::init_test();
    let (_temp_file, db_path) = create_test_db().unwrap();
    let manager = insert_manager(&db_path, "Ольга Руководитель", 42).unwrap();
    let importer = create_importer(&db_path).unwrap();

    let acting = ActingManager::from(&manager);
    let mut raw = valid_record("Новый Сотрудник");
    // 输入中的上级字段不参与赋值
    raw.insert("manager".to_string(), "999".to_string());

    let employee = importer.import_one(&raw, Some(&acting)).unwrap();
    assert_eq!(employee.manager_id, Some(manager.id));

    let subordinates = EmployeeRepository::new(&db_path)
        .unwrap()
        .list_by_manager(manager.id)
        .unwrap();
    assert_eq!(subordinates.len(), 1);
    assert_eq!(subordinates[0].id, employee.id);
}

#[test]
fn test_import_one_twice_creates_two_rows() {
    logging::init_test();
    let (_temp_file, db_path) = create_test_db().unwrap();
    let importer = create_importer(&db_path).unwrap();

    let raw = valid_record("Иван Иванов");
    let first = importer.import_one(&raw, None).unwrap();
    let second = importer.import_one(&raw, None).unwrap();

    assert_ne!(first.id, second.id);
    assert_eq!(count_employees(&db_path).unwrap(), 2);
}

// ==========================================
// 整批导入
// ==========================================

#[test]
fn test_csv_batch_commits_all_rows_under_acting_manager() {
    logging::init_test();
    let (_temp_file, db_path) = create_test_db().unwrap();
    let manager = insert_manager(&db_path, "Ольга Руководитель", 7).unwrap();
    let importer = create_importer(&db_path).unwrap();
    let acting = ActingManager::from(&manager);

    let csv = csv_with_valid_rows(25, "batch");
    let result = importer
        .import_batch(csv.as_bytes(), InputEncoding::Csv, Some(&acting))
        .expect("批量导入失败");
    println!("✓ 步骤 1: 批量导入完成, created_count={}", result.created_count);

    assert!(result.is_success());
    assert_eq!(result.created_count, 25);

    let subordinates = EmployeeRepository::new(&db_path)
        .unwrap()
        .list_by_manager(manager.id)
        .unwrap();
    assert_eq!(subordinates.len(), 25);
    assert!(subordinates
        .iter()
        .all(|e| e.manager_id == Some(manager.id) && e.location.city == "Париж"));
    println!("✓ 步骤 2: 所有新员工的上级均为调用方");
}

#[test]
fn test_csv_batch_rolls_back_on_single_bad_row() {
    logging::init_test();
    let (_temp_file, db_path) = create_test_db().unwrap();
    let importer = create_importer(&db_path).unwrap();

    let csv = "full_name,position,specialization,city,country,telegram_nick\n\
               Иван Иванов,менеджер,python,москва,россия,@ivanov\n\
               Пётр Петров,middle-разработчик,devops,москва,россия,notanick\n\
               Анна Смирнова,junior-разработчик,python,париж,франция,@anna\n";

    let result = importer
        .import_batch(csv.as_bytes(), InputEncoding::Csv, None)
        .unwrap();

    assert!(!result.is_success());
    assert_eq!(result.created_count, 0);
    assert_eq!(result.errors.len(), 1);
    assert_eq!(result.errors[0].line, 3);
    assert!(result.errors[0].errors.contains(fields::TELEGRAM_NICK));

    // 第 1 行已在事务内落库，但整批回滚后不可见
    assert_eq!(count_employees(&db_path).unwrap(), 0);
}

#[test]
fn test_csv_batch_location_error_reported_on_line() {
    logging::init_test();
    let (_temp_file, db_path) = create_test_db().unwrap();
    let importer = create_importer(&db_path).unwrap();

    let csv = "full_name,position,specialization,city,country\n\
               Иван Иванов,менеджер,python,москва,россия\n\
               Пьер Дюбуа,junior-разработчик,devops,париж,россия\n";

    let result = importer
        .import_batch(csv.as_bytes(), InputEncoding::Csv, None)
        .unwrap();

    assert_eq!(result.created_count, 0);
    assert_eq!(result.errors.len(), 1);
    assert_eq!(result.errors[0].line, 3);
    assert!(result.errors[0].errors.contains(fields::LOCATION));
    assert_eq!(count_employees(&db_path).unwrap(), 0);
}

#[test]
fn test_empty_batch_commits_nothing() {
    logging::init_test();
    let (_temp_file, db_path) = create_test_db().unwrap();
    let importer = create_importer(&db_path).unwrap();

    let csv = "full_name,position,specialization,city,country\n";
    let result = importer
        .import_batch(csv.as_bytes(), InputEncoding::Csv, None)
        .unwrap();
    assert!(result.is_success());
    assert_eq!(result.created_count, 0);

    let result = importer
        .import_batch("[]".as_bytes(), InputEncoding::Json, None)
        .unwrap();
    assert!(result.is_success());
    assert_eq!(result.created_count, 0);
}

#[test]
fn test_json_batch_reports_element_position_as_line() {
    logging::init_test();
    let (_temp_file, db_path) = create_test_db().unwrap();
    let importer = create_importer(&db_path).unwrap();

    let body = r#"[
        {"full_name": "Мария", "position": "менеджер", "specialization": "python",
         "city": "москва", "country": "россия"},
        {"full_name": "Жан", "position": "junior-разработчик", "specialization": "devops",
         "city": "париж", "country": "франция"},
        {"full_name": "Олег", "position": "middle-разработчик", "specialization": "python",
         "city": "москва", "country": "россия", "telegram_nick": "oleg"}
    ]"#;

    let result = importer
        .import_batch(body.as_bytes(), InputEncoding::Json, None)
        .unwrap();

    // JSON 按元素序号（从 1 开始）计行
    assert_eq!(result.created_count, 0);
    assert_eq!(result.errors.len(), 1);
    assert_eq!(result.errors[0].line, 3);
    assert!(result.errors[0].errors.contains(fields::TELEGRAM_NICK));
    assert_eq!(count_employees(&db_path).unwrap(), 0);
}

#[test]
fn test_json_batch_non_array_is_decode_error() {
    logging::init_test();
    let (_temp_file, db_path) = create_test_db().unwrap();
    let importer = create_importer(&db_path).unwrap();

    let body = r#"{"full_name": "Иван Иванов"}"#;
    let err = importer
        .import_batch(body.as_bytes(), InputEncoding::Json, None)
        .unwrap_err();
    assert!(matches!(err, ImportError::Decode(_)));
    assert_eq!(count_employees(&db_path).unwrap(), 0);
}

// ==========================================
// 文件导入
// ==========================================

#[test]
fn test_import_csv_fixture_file() {
    logging::init_test();
    let (_temp_file, db_path) = create_test_db().unwrap();
    let importer = create_importer(&db_path).unwrap();

    let result = importer
        .import_file(fixture_path("valid_employees.csv"), None)
        .expect("CSV 文件导入失败");
    assert!(result.is_success());
    assert_eq!(result.created_count, 3);
    assert_eq!(count_employees(&db_path).unwrap(), 3);
}

#[test]
fn test_import_json_fixture_ignores_supplied_manager() {
    logging::init_test();
    let (_temp_file, db_path) = create_test_db().unwrap();
    let importer = create_importer(&db_path).unwrap();

    let result = importer
        .import_file(fixture_path("valid_employees.json"), None)
        .expect("JSON 文件导入失败");
    assert!(result.is_success());
    assert_eq!(result.created_count, 2);

    // 匿名调用方：输入中的 manager 字段被忽略
    let repo = EmployeeRepository::new(&db_path).unwrap();
    let first = repo.find_view_by_id(1).unwrap().expect("员工未落库");
    assert_eq!(first.manager_id, None);
    assert_eq!(first.position, Position::Middle);
    assert_eq!(first.specialization, Specialization::DevOps);
}

#[test]
fn test_import_fixture_with_invalid_nick_rolls_back() {
    logging::init_test();
    let (_temp_file, db_path) = create_test_db().unwrap();
    let importer = create_importer(&db_path).unwrap();

    let result = importer
        .import_file(fixture_path("invalid_nick.csv"), None)
        .unwrap();
    assert_eq!(result.created_count, 0);
    assert_eq!(result.errors.len(), 1);
    assert_eq!(result.errors[0].line, 3);
    assert_eq!(count_employees(&db_path).unwrap(), 0);
}

#[test]
fn test_import_malformed_csv_is_decode_error() {
    logging::init_test();
    let (_temp_file, db_path) = create_test_db().unwrap();
    let importer = create_importer(&db_path).unwrap();

    let err = importer
        .import_file(fixture_path("malformed.csv"), None)
        .unwrap_err();
    assert!(matches!(err, ImportError::Decode(_)));
    assert_eq!(count_employees(&db_path).unwrap(), 0);
}

#[test]
fn test_import_file_errors() {
    logging::init_test();
    let (_temp_file, db_path) = create_test_db().unwrap();
    let importer = create_importer(&db_path).unwrap();

    let err = importer
        .import_file(fixture_path("employees.xlsx"), None)
        .unwrap_err();
    assert!(matches!(err, ImportError::UnsupportedFormat(_)));

    let err = importer
        .import_file(fixture_path("does_not_exist.csv"), None)
        .unwrap_err();
    assert!(matches!(err, ImportError::FileNotFound(_)));
}
