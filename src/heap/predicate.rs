use crate::errors::{Result, StorageError};
use std::cmp::Ordering;
use std::convert::TryInto;
use std::mem::size_of;

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Datatype {
    String,
    Integer,
    Float,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Operator {
    Lt,
    Lte,
    Eq,
    Gte,
    Gt,
    Ne,
}

impl Operator {
    // An unordered comparison (a NaN float) only satisfies `Ne`.
    fn holds(self, ordering: Option<Ordering>) -> bool {
        match ordering {
            None => self == Operator::Ne,
            Some(ord) => match self {
                Operator::Lt => ord == Ordering::Less,
                Operator::Lte => ord != Ordering::Greater,
                Operator::Eq => ord == Ordering::Equal,
                Operator::Gte => ord != Ordering::Less,
                Operator::Gt => ord == Ordering::Greater,
                Operator::Ne => ord != Ordering::Equal,
            },
        }
    }
}

#[derive(Clone, Debug, PartialEq)]
pub struct ScanPredicate {
    offset: usize,
    length: usize,
    datatype: Datatype,
    value: Vec<u8>,
    op: Operator,
}

impl ScanPredicate {
    pub fn new(
        offset: i32,
        length: i32,
        datatype: Datatype,
        value: &[u8],
        op: Operator,
    ) -> Result<Self> {
        if offset < 0 {
            bail!(StorageError::BadScanParameter("negative offset"));
        }
        if length < 1 {
            bail!(StorageError::BadScanParameter("length must be at least 1"));
        }
        let length = length as usize;
        let width = match datatype {
            Datatype::Integer => Some(size_of::<i32>()),
            Datatype::Float => Some(size_of::<f32>()),
            Datatype::String => None,
        };
        if width.map_or(false, |width| width != length) {
            bail!(StorageError::BadScanParameter(
                "length does not match the width of the type"
            ));
        }
        if value.len() < length {
            bail!(StorageError::BadScanParameter("filter value shorter than length"));
        }

        Ok(Self {
            offset: offset as usize,
            length,
            datatype,
            value: value[..length].to_vec(),
            op,
        })
    }

    pub fn matches(&self, record: &[u8]) -> bool {
        let end = self.offset + self.length;
        if end > record.len() {
            return false;
        }
        let attr = &record[self.offset..end];

        let ordering = match self.datatype {
            Datatype::Integer => Some(native_i32(attr).cmp(&native_i32(&self.value))),
            Datatype::Float => native_f32(attr).partial_cmp(&native_f32(&self.value)),
            Datatype::String => Some(attr.cmp(&self.value[..])),
        };
        self.op.holds(ordering)
    }
}

// Callers guarantee four bytes; the width is checked in `ScanPredicate::new`.
fn native_i32(bytes: &[u8]) -> i32 {
    i32::from_ne_bytes(bytes.try_into().unwrap_or_default())
}

fn native_f32(bytes: &[u8]) -> f32 {
    f32::from_ne_bytes(bytes.try_into().unwrap_or_default())
}
