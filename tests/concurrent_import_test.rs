// ==========================================
// 并发导入测试
// ==========================================
// 测试目标: 多连接并发整批导入时的事务隔离与计数正确性
// ==========================================


use employee_directory::db::open_sqlite_connection;
use employee_directory::domain::{NewEmployee, Position, Specialization};
use employee_directory::importer::{EmployeeImporter, ImportError, InputEncoding};
use employee_directory::logging;
use employee_directory::repository::{
    EmployeeImportRepository, EmployeeImportRepositoryImpl, EmployeeRepository, RepositoryError,
};
use std::sync::{Arc, Barrier};
use std::thread;
use std::time::{Duration, Instant};
use test_helpers::*;

#[test]
fn test_uncommitted_rows_invisible_to_other_connections() {
    logging::init_test();
    let (_temp_file, db_path) = create_test_db().expect("创建测试数据库失败");
    let import_repo = EmployeeImportRepositoryImpl::new(&db_path).unwrap();

    let outcome: Result<(), RepositoryError> = import_repo.in_transaction(|session| {
        let location = session
            .find_location("Москва", "Россия")?
            .ok_or_else(|| RepositoryError::NotFound {
                entity: "Location".to_string(),
                id: "Москва".to_string(),
            })?;
        session.insert_employee(&NewEmployee {
            full_name: "Иван Иванов".to_string(),
            position: Position::Manager,
            specialization: Specialization::Python,
            location_id: location.id,
            telegram_nick: None,
            about: None,
            manager_id: None,
            created_at: chrono::Utc::now(),
        })?;

        // 其他连接看不到未提交的数据
        let visible = EmployeeRepository::new(&db_path)?.count()?;
        assert_eq!(visible, 0);
        println!("✓ 步骤 1: 事务内插入对其他连接不可见");

        Err(RepositoryError::InternalError("模拟后续行失败".to_string()))
    });

    assert!(outcome.is_err());
    assert_eq!(count_employees(&db_path).unwrap(), 0);
    println!("✓ 步骤 2: 回滚后无残留数据");
}

#[test]
fn test_parallel_batches_all_commit() {
    logging::init_test();
    let (_temp_file, db_path) = create_test_db().expect("创建测试数据库失败");

    const WORKERS: usize = 4;
    const ROWS_PER_BATCH: usize = 50;
    let barrier = Arc::new(Barrier::new(WORKERS));

    let handles: Vec<_> = (0..WORKERS)
        .map(|worker| {
            let db_path = db_path.clone();
            let barrier = barrier.clone();
            thread::spawn(move || {
                let importer = create_importer(&db_path).expect("创建导入器失败");
                let csv = csv_with_valid_rows(ROWS_PER_BATCH, &format!("w{}", worker));
                barrier.wait();
                importer
                    .import_batch(csv.as_bytes(), InputEncoding::Csv, None)
                    .expect("并发导入失败")
            })
        })
        .collect();

    for handle in handles {
        let result = handle.join().expect("线程异常退出");
        assert!(result.is_success());
        assert_eq!(result.created_count, ROWS_PER_BATCH);
    }

    assert_eq!(count_employees(&db_path).unwrap(), WORKERS * ROWS_PER_BATCH);
    println!("✓ 并发导入完成: {} 行", WORKERS * ROWS_PER_BATCH);
}

#[test]
fn test_parallel_failed_batch_leaves_no_rows() {
    logging::init_test();
    let (_temp_file, db_path) = create_test_db().expect("创建测试数据库失败");
    let barrier = Arc::new(Barrier::new(2));

    let good = {
        let db_path = db_path.clone();
        let barrier = barrier.clone();
        thread::spawn(move || {
            let importer = create_importer(&db_path).expect("创建导入器失败");
            let csv = csv_with_valid_rows(30, "good");
            barrier.wait();
            importer
                .import_batch(csv.as_bytes(), InputEncoding::Csv, None)
                .expect("导入失败")
        })
    };

    let bad = {
        let db_path = db_path.clone();
        let barrier = barrier.clone();
        thread::spawn(move || {
            let importer = create_importer(&db_path).expect("创建导入器失败");
            let mut csv = csv_with_valid_rows(30, "bad");
            csv.push_str("Сломанная Строка,middle-разработчик,devops,париж,россия,\n");
            barrier.wait();
            importer
                .import_batch(csv.as_bytes(), InputEncoding::Csv, None)
                .expect("导入失败")
        })
    };

    let good = good.join().expect("线程异常退出");
    let bad = bad.join().expect("线程异常退出");

    assert_eq!(good.created_count, 30);
    assert_eq!(bad.created_count, 0);
    assert_eq!(bad.errors.len(), 1);
    // 表头第 1 行 + 30 行合法数据
    assert_eq!(bad.errors[0].line, 32);

    let repo = EmployeeRepository::new(&db_path).unwrap();
    assert_eq!(repo.count().unwrap(), 30);
}

#[test]
fn test_blocked_writer_fails_with_persistence_error_after_busy_timeout() {
    logging::init_test();
    let (_temp_file, db_path) = create_test_db().expect("创建测试数据库失败");

    // 另一连接持有写锁
    let holder = open_sqlite_connection(&db_path).unwrap();
    holder.execute_batch("BEGIN IMMEDIATE").unwrap();
    println!("✓ 步骤 1: 另一连接已持有写事务");

    let importer = create_importer_with_busy_timeout(&db_path, 200).expect("创建导入器失败");
    let csv = csv_with_valid_rows(3, "blocked");

    let start = Instant::now();
    let err = importer
        .import_batch(csv.as_bytes(), InputEncoding::Csv, None)
        .unwrap_err();
    let waited = start.elapsed();

    assert!(matches!(err, ImportError::Persistence(_)), "实际: {:?}", err);
    assert!(waited >= Duration::from_millis(150));
    assert!(waited < Duration::from_secs(5));
    println!("✓ 步骤 2: 等待 {:?} 后以持久化错误失败", waited);

    holder.execute_batch("ROLLBACK").unwrap();
    assert_eq!(count_employees(&db_path).unwrap(), 0);

    // 写锁释放后同一导入器可正常提交
    let result = importer
        .import_batch(csv.as_bytes(), InputEncoding::Csv, None)
        .expect("导入失败");
    assert_eq!(result.created_count, 3);
    println!("✓ 步骤 3: 写锁释放后导入成功");
}
