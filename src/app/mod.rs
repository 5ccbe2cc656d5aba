// 子指令的執行流程，main 只負責解析參數、日誌與結束碼

pub mod commands;

pub use commands::{execute, Outcome, LINT_FAILED_EXIT_CODE};
