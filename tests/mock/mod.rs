#![allow(dead_code)]
use quarry::{Error, Result, Rows, RowsAffected, ScanTarget, Session, Value};
use std::{
    collections::VecDeque,
    sync::{Arc, Mutex},
};

/// Session recording every statement and replying with scripted result sets.
#[derive(Default, Clone)]
pub struct MockSession {
    pub statements: Arc<Mutex<Vec<(String, Vec<Value>)>>>,
    pub results: Arc<Mutex<VecDeque<MockRows>>>,
    pub affected: u64,
}

impl MockSession {
    pub fn new() -> Self {
        Self {
            affected: 1,
            ..Default::default()
        }
    }

    /// Queues the result set returned by the next query.
    pub fn reply(&self, columns: &[&str], rows: Vec<Vec<Value>>) {
        self.results.lock().unwrap().push_back(MockRows {
            columns: columns.iter().map(|v| v.to_string()).collect(),
            rows: rows.into(),
            current: None,
        });
    }

    pub fn statements(&self) -> Vec<String> {
        self.statements
            .lock()
            .unwrap()
            .iter()
            .map(|(sql, _)| sql.clone())
            .collect()
    }
}

#[derive(Debug)]
pub struct MockRows {
    columns: Vec<String>,
    rows: VecDeque<Vec<Value>>,
    current: Option<Vec<Value>>,
}

impl Rows for MockRows {
    fn columns(&self) -> &[String] {
        &self.columns
    }

    fn next(&mut self) -> Result<bool> {
        self.current = self.rows.pop_front();
        Ok(self.current.is_some())
    }

    fn scan(&mut self, targets: &mut [&mut dyn ScanTarget]) -> Result<()> {
        let Some(row) = self.current.take() else {
            return Err(Error::msg("scan called without a current row"));
        };
        if row.len() != targets.len() {
            return Err(Error::msg(format!(
                "expected {} targets, got {}",
                row.len(),
                targets.len()
            )));
        }
        for (target, value) in targets.iter_mut().zip(row) {
            target.assign(value)?;
        }
        Ok(())
    }
}

impl Session for MockSession {
    type Rows = MockRows;

    async fn query_context(&self, sql: &str, args: &[Value]) -> Result<MockRows> {
        self.statements
            .lock()
            .unwrap()
            .push((sql.to_string(), args.to_vec()));
        Ok(self.results.lock().unwrap().pop_front().unwrap_or(MockRows {
            columns: Vec::new(),
            rows: VecDeque::new(),
            current: None,
        }))
    }

    async fn exec_context(&self, sql: &str, args: &[Value]) -> Result<RowsAffected> {
        self.statements
            .lock()
            .unwrap()
            .push((sql.to_string(), args.to_vec()));
        Ok(RowsAffected {
            rows_affected: self.affected,
            last_insert_id: None,
        })
    }
}
