//! 行与行结构描述。
//!
//! 行集对行内容完全不感知：它只搬运 [`Row`] 句柄，并为整条通道挂接一份 [`RowSchema`] 引用。
//! 值的类型转换、比较与序列化属于外部的类型系统，这里只保留最小的值表示，
//! 让通道的测试与基准可以构造真实形状的数据。

use std::{fmt, sync::Arc};

/// 行结构的共享引用；同一条通道上的所有行共享同一份结构。
pub type SchemaRef = Arc<RowSchema>;

/// 单个字段值。
#[derive(Clone, Debug, PartialEq)]
pub enum Value {
    Null,
    Boolean(bool),
    Integer(i64),
    Number(f64),
    String(Arc<str>),
    Binary(Arc<[u8]>),
}

impl Value {
    /// 值所属的类型标签。
    pub fn kind(&self) -> ValueKind {
        match self {
            Value::Null => ValueKind::None,
            Value::Boolean(_) => ValueKind::Boolean,
            Value::Integer(_) => ValueKind::Integer,
            Value::Number(_) => ValueKind::Number,
            Value::String(_) => ValueKind::String,
            Value::Binary(_) => ValueKind::Binary,
        }
    }
}

impl From<i64> for Value {
    fn from(value: i64) -> Self {
        Value::Integer(value)
    }
}

impl From<&str> for Value {
    fn from(value: &str) -> Self {
        Value::String(Arc::from(value))
    }
}

/// 字段类型标签，仅用于描述，不参与任何转换。
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum ValueKind {
    None,
    Boolean,
    Integer,
    Number,
    String,
    Binary,
}

/// 一行记录：定长、有序的值序列。
///
/// # 契约说明（What）
/// - 克隆成本为一次 `Arc` 引用计数递增，行集在步骤之间移动的正是这个句柄；
/// - 行一旦交给行集，生产者不得再修改它，`Row` 本身不可变，从类型上保证了这一点。
#[derive(Clone, PartialEq)]
pub struct Row(Arc<[Value]>);

impl Row {
    /// 由值序列构造一行。
    pub fn new(values: Vec<Value>) -> Self {
        Self(Arc::from(values))
    }

    /// 全部字段值。
    pub fn values(&self) -> &[Value] {
        &self.0
    }

    /// 按下标读取字段。
    pub fn get(&self, index: usize) -> Option<&Value> {
        self.0.get(index)
    }

    /// 字段个数。
    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// 判断两个句柄是否指向同一份行数据。
    pub fn ptr_eq(&self, other: &Row) -> bool {
        Arc::ptr_eq(&self.0, &other.0)
    }
}

impl FromIterator<Value> for Row {
    fn from_iter<I: IntoIterator<Item = Value>>(iter: I) -> Self {
        Self(iter.into_iter().collect())
    }
}

impl fmt::Debug for Row {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_list().entries(self.0.iter()).finish()
    }
}

/// 列描述：名称与类型标签。
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ColumnMeta {
    name: Arc<str>,
    kind: ValueKind,
}

impl ColumnMeta {
    pub fn new(name: impl Into<Arc<str>>, kind: ValueKind) -> Self {
        Self {
            name: name.into(),
            kind,
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn kind(&self) -> ValueKind {
        self.kind
    }
}

/// 行结构描述：一组有序的列。
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct RowSchema {
    columns: Vec<ColumnMeta>,
}

impl RowSchema {
    pub fn new(columns: Vec<ColumnMeta>) -> Self {
        Self { columns }
    }

    pub fn columns(&self) -> &[ColumnMeta] {
        &self.columns
    }

    pub fn len(&self) -> usize {
        self.columns.len()
    }

    pub fn is_empty(&self) -> bool {
        self.columns.is_empty()
    }

    /// 按名称（忽略大小写）查找列下标。
    pub fn index_of(&self, name: &str) -> Option<usize> {
        self.columns
            .iter()
            .position(|column| column.name.eq_ignore_ascii_case(name))
    }
}
