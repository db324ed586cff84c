//! End-to-end query tests against a stand-in listing utility.
//!
//! These tests spawn real child processes (shell scripts) so the whole
//! pipeline runs: argument building, spawn, concurrent stdout/stderr drain,
//! row decoding, and reaping.

#![cfg(unix)]

mod support;

use pl_common::ProcessId;
use pl_core::collect::{
    build_args, ModulesOption, QueryError, QueryOptions, TaskList, TaskListConfig,
};
use std::time::{Duration, Instant};
use support::fake_tasklist::{FakeTaskList, DEFAULT_ROWS, NO_MATCH};

fn tasklist(fake: &FakeTaskList) -> TaskList {
    TaskList::new(TaskListConfig::new().with_program(fake.program_str()))
}

// ============================================================================
// Listing
// ============================================================================

mod listing {
    use super::*;

    #[tokio::test]
    async fn default_mode_decodes_rows_in_order() {
        let fake = FakeTaskList::printing(DEFAULT_ROWS, 0);
        let records = tasklist(&fake).query(&QueryOptions::new()).await;

        assert_eq!(records.len(), 3);
        assert_eq!(records[0].name, "System Idle Process");
        assert_eq!(records[0].pid, ProcessId(0));
        assert_eq!(records[0].mem_usage, Some(8 * 1024));
        assert_eq!(records[1].name, "notepad.exe");
        assert_eq!(records[1].session_name.as_deref(), Some("Console"));
        assert_eq!(records[1].session_number, Some(1));
        assert_eq!(records[1].mem_usage, Some(6_000 * 1024));
        assert_eq!(records[2].pid, ProcessId(5678));
        assert_eq!(records[2].status, None);
    }

    #[tokio::test]
    async fn headers_and_blank_lines_are_skipped() {
        let mut lines = vec![
            "",
            "Image Name                     PID Session Name        Session#    Mem Usage",
            "========================= ======== ================ =========== ============",
        ];
        lines.extend_from_slice(DEFAULT_ROWS);
        let fake = FakeTaskList::printing(&lines, 0);

        let output = tasklist(&fake)
            .try_query(&QueryOptions::new())
            .await
            .expect("query succeeds");

        assert_eq!(output.records.len(), 3);
        assert_eq!(output.metadata.lines_read, 6);
        assert_eq!(output.metadata.lines_skipped, 3);
        assert_eq!(output.metadata.exit_code, Some(0));
        assert_eq!(output.metadata.mode, "default");
        assert!(output.metadata.warnings.is_empty());
    }

    #[tokio::test]
    async fn verbose_mode_reads_nine_columns() {
        let fake = FakeTaskList::printing(
            &[
                r#""explorer.exe","4321","Console","1","120,512 K","Running","HOST\alice","0:12:34","Program Manager""#,
            ],
            0,
        );
        let options = QueryOptions::new().with_verbose(true);
        let records = tasklist(&fake).query(&options).await;

        assert_eq!(records.len(), 1);
        let record = &records[0];
        assert_eq!(record.status.as_deref(), Some("Running"));
        assert_eq!(record.username.as_deref(), Some(r"HOST\alice"));
        assert_eq!(record.cpu_time, Some(12 * 60 + 34));
        assert_eq!(record.window_title.as_deref(), Some("Program Manager"));
    }

    #[tokio::test]
    async fn modules_mode_splits_module_list() {
        let fake = FakeTaskList::printing(
            &[r#""svchost.exe","1000","ntdll.dll,KERNEL32.DLL,RPCRT4.dll""#],
            0,
        );
        let options = QueryOptions::new().with_modules(true);
        let records = tasklist(&fake).query(&options).await;

        assert_eq!(records.len(), 1);
        let expected = ["ntdll.dll", "KERNEL32.DLL", "RPCRT4.dll"].map(String::from);
        assert_eq!(records[0].modules.as_deref(), Some(&expected[..]));
        assert!(records[0].has_module("kernel32.dll"));
        assert_eq!(records[0].mem_usage, None);
    }

    #[tokio::test]
    async fn services_mode_keeps_na_verbatim() {
        let fake = FakeTaskList::printing(&[r#""smss.exe","340","N/A""#], 0);
        let options = QueryOptions::new().with_services(true);
        let records = tasklist(&fake).query(&options).await;

        assert_eq!(records[0].services.as_deref(), Some(&["N/A".to_string()][..]));
    }

    #[tokio::test]
    async fn degraded_rows_are_kept_with_warnings() {
        let fake = FakeTaskList::printing(
            &[r#""short.exe","77""#, r#""bad.exe","x1","Console","1","9 K""#],
            0,
        );
        let output = tasklist(&fake)
            .try_query(&QueryOptions::new())
            .await
            .expect("query succeeds");

        assert_eq!(output.records.len(), 2);
        assert_eq!(output.records[0].pid, ProcessId(77));
        // Missing columns take their empty value.
        assert_eq!(output.records[0].mem_usage, Some(0));
        assert_eq!(output.records[0].session_name.as_deref(), Some(""));
        assert_eq!(output.records[1].pid, ProcessId(0));
        assert_eq!(output.metadata.warnings.len(), 2);
        assert!(output.metadata.warnings[0].starts_with("line 1:"));
        assert!(output.metadata.warnings[1].starts_with("line 2:"));
    }
}

// ============================================================================
// Lookups
// ============================================================================

mod lookups {
    use super::*;

    #[tokio::test]
    async fn find_by_id_returns_first_row() {
        let fake = FakeTaskList::printing(&DEFAULT_ROWS[1..2], 0);
        let found = tasklist(&fake)
            .find_by_id(1234u32, &QueryOptions::new())
            .await
            .expect("process present");

        assert_eq!(found.pid, ProcessId(1234));
        assert_eq!(found.name, "notepad.exe");
    }

    #[tokio::test]
    async fn find_by_id_absent_is_none() {
        let fake = FakeTaskList::printing(&[NO_MATCH], 0);
        let found = tasklist(&fake).find_by_id(99_999u32, &QueryOptions::new()).await;
        assert!(found.is_none());
    }

    #[tokio::test]
    async fn find_by_name_keeps_output_order() {
        let fake = FakeTaskList::printing(&DEFAULT_ROWS[1..], 0);
        let found = tasklist(&fake)
            .find_by_name("notepad.exe", &QueryOptions::new())
            .await;

        let pids: Vec<u32> = found.iter().map(|r| r.pid.0).collect();
        assert_eq!(pids, vec![1234, 5678]);
    }

    #[tokio::test]
    async fn find_by_name_no_match_is_empty() {
        let fake = FakeTaskList::printing(&[NO_MATCH], 0);
        let found = tasklist(&fake)
            .find_by_name("nothing.exe", &QueryOptions::new())
            .await;
        assert!(found.is_empty());
    }

    #[tokio::test]
    async fn try_find_by_id_keeps_first_row_and_metadata() {
        let fake = FakeTaskList::printing(&DEFAULT_ROWS[1..], 0);
        let output = tasklist(&fake)
            .try_find_by_id(1234u32, &QueryOptions::new())
            .await
            .expect("query succeeds");

        assert_eq!(output.records.len(), 1);
        assert_eq!(output.records[0].pid, ProcessId(1234));
        assert_eq!(output.metadata.lines_read, 2);
    }

    #[tokio::test]
    async fn lookup_filters_follow_caller_filters() {
        let fake = FakeTaskList::recording(&DEFAULT_ROWS[1..2]);
        let options = QueryOptions::new().with_filter("STATUS eq RUNNING");
        tasklist(&fake).find_by_id(1234u32, &options).await;

        let args = fake.recorded_args();
        let tail = &args[args.len() - 4..];
        assert_eq!(tail, ["/fi", "STATUS eq RUNNING", "/fi", "PID eq 1234"]);
    }
}

// ============================================================================
// Invocation
// ============================================================================

mod invocation {
    use super::*;

    #[tokio::test]
    async fn arguments_reach_the_utility_unchanged() {
        let fake = FakeTaskList::recording(&[NO_MATCH]);
        let options = QueryOptions::new()
            .with_system("srv01")
            .with_username(r"CORP\ops")
            .with_password("s3cret with space")
            .with_modules(ModulesOption::from("ntdll.dll"))
            .with_filter("MEMUSAGE gt 1024");

        tasklist(&fake).query(&options).await;

        assert_eq!(fake.recorded_args(), build_args(&options));
        assert_eq!(
            fake.recorded_args(),
            vec![
                "/fo", "csv", "/nh", "/s", "srv01", "/u", r"CORP\ops", "/p",
                "s3cret with space", "/m", "ntdll.dll", "/fi", "MEMUSAGE gt 1024",
            ]
        );
    }

    #[tokio::test]
    async fn empty_options_are_not_passed() {
        let fake = FakeTaskList::recording(&DEFAULT_ROWS[1..2]);
        let options = QueryOptions::new()
            .with_system("")
            .with_username("")
            .with_password("pw")
            .with_modules("");

        let output = tasklist(&fake)
            .try_query(&options)
            .await
            .expect("query succeeds");

        assert_eq!(fake.recorded_args(), vec!["/fo", "csv", "/nh"]);
        assert_eq!(output.metadata.mode, "default");
        assert_eq!(output.metadata.system, None);
        assert_eq!(output.records[0].mem_usage, Some(6_000 * 1024));
    }

    #[tokio::test]
    async fn nonzero_exit_yields_empty_listing() {
        let fake = FakeTaskList::with_body(
            "printf '%s\\r\\n' '\"notepad.exe\",\"1234\",\"Console\",\"1\",\"6,000 K\"'\n\
             echo 'ERROR: The RPC server is unavailable.' >&2\n\
             exit 1",
        );
        let list = tasklist(&fake);

        assert!(list.query(&QueryOptions::new().with_system("gone")).await.is_empty());

        match list.try_query(&QueryOptions::new()).await {
            Err(QueryError::NonZeroExit { code, stderr }) => {
                assert_eq!(code, 1);
                assert_eq!(stderr, "ERROR: The RPC server is unavailable.");
            }
            other => panic!("expected NonZeroExit, got {:?}", other),
        }
    }

    #[tokio::test]
    async fn missing_program_yields_empty_listing() {
        let fake = FakeTaskList::printing(&[], 0);
        let missing = fake.dir().join("does-not-exist");
        let list = TaskList::new(TaskListConfig::new().with_program(missing.display().to_string()));

        assert!(list.query(&QueryOptions::new()).await.is_empty());
        assert!(list.find_by_id(4u32, &QueryOptions::new()).await.is_none());
        assert!(matches!(
            list.try_query(&QueryOptions::new()).await,
            Err(QueryError::Spawn { .. })
        ));
    }

    #[tokio::test]
    async fn timeout_kills_a_hung_utility() {
        let fake = FakeTaskList::with_body("sleep 30");
        let list = TaskList::new(
            TaskListConfig::new()
                .with_program(fake.program_str())
                .with_timeout(Duration::from_millis(300)),
        );

        let start = Instant::now();
        let result = list.try_query(&QueryOptions::new()).await;

        assert!(matches!(result, Err(QueryError::Timeout(_))));
        assert!(start.elapsed() < Duration::from_secs(10));
    }

    #[tokio::test]
    async fn chatty_stderr_does_not_stall_the_query() {
        // Well past a pipe buffer, so an undrained stderr would block the child.
        let fake = FakeTaskList::with_body(
            "head -c 262144 /dev/zero | tr '\\0' 'x' >&2\n\
             printf '%s\\r\\n' '\"notepad.exe\",\"1234\",\"Console\",\"1\",\"6,000 K\"'",
        );
        let list = TaskList::new(
            TaskListConfig::new()
                .with_program(fake.program_str())
                .with_timeout(Duration::from_secs(20)),
        );

        let records = list.query(&QueryOptions::new()).await;
        assert_eq!(records.len(), 1);
    }

    #[tokio::test]
    async fn concurrent_queries_are_independent() {
        let fake_a = FakeTaskList::printing(&DEFAULT_ROWS[..1], 0);
        let fake_b = FakeTaskList::printing(&DEFAULT_ROWS[1..], 0);
        let (a, b) = (tasklist(&fake_a), tasklist(&fake_b));
        let options = QueryOptions::new();

        let (left, right) = tokio::join!(a.query(&options), b.query(&options));
        assert_eq!(left.len(), 1);
        assert_eq!(right.len(), 2);
    }
}
