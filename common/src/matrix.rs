//! 疎なピボット行列
//!
//! (行キー, 列キー) → 値 の対応を持ち、既知の行・列集合を明示的に
//! 登録してから密なテーブルに展開する。列順・行順は登録順。

use std::collections::HashMap;
use std::hash::Hash;

#[derive(Debug, Clone)]
pub struct PivotMatrix<R, V> {
    rows: Vec<R>,
    row_index: HashMap<R, usize>,
    columns: Vec<String>,
    column_index: HashMap<String, usize>,
    cells: HashMap<(usize, usize), V>,
}

impl<R, V> Default for PivotMatrix<R, V> {
    fn default() -> Self {
        Self {
            rows: Vec::new(),
            row_index: HashMap::new(),
            columns: Vec::new(),
            column_index: HashMap::new(),
            cells: HashMap::new(),
        }
    }
}

impl<R: Clone + Eq + Hash, V> PivotMatrix<R, V> {
    pub fn new() -> Self {
        Self::default()
    }

    /// 行を登録（登録済みなら既存のインデックス）
    pub fn add_row(&mut self, row: R) -> usize {
        if let Some(&idx) = self.row_index.get(&row) {
            return idx;
        }
        let idx = self.rows.len();
        self.row_index.insert(row.clone(), idx);
        self.rows.push(row);
        idx
    }

    /// 列を登録（登録済みなら既存のインデックス）
    pub fn add_column(&mut self, column: &str) -> usize {
        if let Some(&idx) = self.column_index.get(column) {
            return idx;
        }
        let idx = self.columns.len();
        self.column_index.insert(column.to_string(), idx);
        self.columns.push(column.to_string());
        idx
    }

    pub fn rows(&self) -> &[R] {
        &self.rows
    }

    pub fn columns(&self) -> &[String] {
        &self.columns
    }

    pub fn get(&self, row: &R, column: &str) -> Option<&V> {
        let r = self.row_index.get(row)?;
        let c = self.column_index.get(column)?;
        self.cells.get(&(*r, *c))
    }

    /// 値を直接設定（行・列は自動登録）
    pub fn insert(&mut self, row: R, column: &str, value: V) -> Option<V> {
        let r = self.add_row(row);
        let c = self.add_column(column);
        self.cells.insert((r, c), value)
    }

    /// 行を並べ替える
    pub fn sort_rows_by<F>(&mut self, mut compare: F)
    where
        F: FnMut(&R, &R) -> std::cmp::Ordering,
    {
        let mut order: Vec<usize> = (0..self.rows.len()).collect();
        order.sort_by(|a, b| compare(&self.rows[*a], &self.rows[*b]));

        let mut new_position = vec![0; order.len()];
        for (new_idx, old_idx) in order.iter().enumerate() {
            new_position[*old_idx] = new_idx;
        }

        self.rows = order.iter().map(|&i| self.rows[i].clone()).collect();
        self.row_index = self
            .rows
            .iter()
            .enumerate()
            .map(|(i, r)| (r.clone(), i))
            .collect();
        self.cells = std::mem::take(&mut self.cells)
            .into_iter()
            .map(|((r, c), v)| ((new_position[r], c), v))
            .collect();
    }

    /// 密な表に展開
    ///
    /// 値の無いセルは `fill(行, 列名)` で埋める。
    pub fn dense<T, M, F>(&self, map: M, fill: F) -> Vec<Vec<T>>
    where
        M: Fn(&V) -> T,
        F: Fn(&R, &str) -> T,
    {
        self.rows
            .iter()
            .enumerate()
            .map(|(r, row)| {
                self.columns
                    .iter()
                    .enumerate()
                    .map(|(c, column)| match self.cells.get(&(r, c)) {
                        Some(v) => map(v),
                        None => fill(row, column),
                    })
                    .collect()
            })
            .collect()
    }
}

impl<R: Clone + Eq + Hash, V: Default> PivotMatrix<R, V> {
    /// セルへの可変参照（無ければ既定値で作成）
    pub fn entry(&mut self, row: R, column: &str) -> &mut V {
        let r = self.add_row(row);
        let c = self.add_column(column);
        self.cells.entry((r, c)).or_default()
    }
}
