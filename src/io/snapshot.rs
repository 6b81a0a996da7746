//! Parquet directory snapshot read/write operations
//!
//! A snapshot holds three kinds of rows in one file: organization rows
//! (`org_*` columns set), employee rows (`emp_*` columns set) and a single
//! metadata row (`meta_*` columns set). Columns not used by a row are null.

use crate::models::{Employee, OrgUnit, SnapshotMeta};
use crate::services::directory::Directory;
use arrow_array::{
    Array, ArrayRef, RecordBatch, StringArray, UInt32Array, UInt64Array, new_null_array,
};
use arrow_schema::{DataType, Field, Schema};
use parquet::arrow::ArrowWriter;
use parquet::arrow::arrow_reader::ParquetRecordBatchReaderBuilder;
use parquet::file::properties::WriterProperties;
use std::collections::HashMap;
use std::fs::File;
use std::io::{Error, ErrorKind, Result};
use std::path::Path;
use std::sync::Arc;

const ORG_STRING_COLUMNS: [&str; 6] = [
    "org_id",
    "org_name",
    "org_full_name",
    "org_parent_id",
    "org_sort_code",
    "org_company_code",
];

const EMP_STRING_COLUMNS: [&str; 13] = [
    "emp_id",
    "emp_name",
    "emp_position",
    "emp_role",
    "emp_department",
    "emp_org_full_name",
    "emp_org_id",
    "emp_extension",
    "emp_mobile",
    "emp_email",
    "emp_company_name",
    "emp_company_code",
    "emp_description",
];

/// Return the Arrow schema shared by snapshot writers and readers.
#[must_use]
pub fn snapshot_schema() -> Arc<Schema> {
    let mut fields: Vec<Field> = ORG_STRING_COLUMNS
        .iter()
        .map(|name| Field::new(*name, DataType::Utf8, true))
        .collect();
    fields.push(Field::new("org_level", DataType::UInt32, true));
    fields.extend(
        EMP_STRING_COLUMNS
            .iter()
            .map(|name| Field::new(*name, DataType::Utf8, true)),
    );
    fields.push(Field::new("meta_source", DataType::Utf8, true));
    fields.push(Field::new("meta_exported_at", DataType::Utf8, true));
    fields.push(Field::new("meta_org_count", DataType::UInt64, true));
    fields.push(Field::new("meta_employee_count", DataType::UInt64, true));
    Arc::new(Schema::new(fields))
}

/// Write a directory snapshot to a Parquet file.
pub fn write_snapshot(path: &str, meta: &SnapshotMeta, directory: &Directory) -> Result<()> {
    let file_path = Path::new(path);

    if let Some(parent) = file_path.parent()
        && !parent.as_os_str().is_empty()
    {
        std::fs::create_dir_all(parent)?;
    }

    let file = File::create(file_path)?;
    let schema = snapshot_schema();
    let props = WriterProperties::builder().build();
    let mut writer =
        ArrowWriter::try_new(file, schema.clone(), Some(props)).map_err(Error::other)?;

    if !directory.orgs().is_empty() {
        let batch = create_orgs_batch(&schema, directory.orgs())?;
        writer.write(&batch).map_err(Error::other)?;
    }

    if !directory.employees().is_empty() {
        let batch = create_employees_batch(&schema, directory.employees())?;
        writer.write(&batch).map_err(Error::other)?;
    }

    let metadata_batch = create_metadata_batch(&schema, meta)?;
    writer.write(&metadata_batch).map_err(Error::other)?;

    writer.close().map_err(Error::other)?;
    Ok(())
}

/// Read a directory snapshot from a Parquet file.
pub fn read_snapshot(path: &str) -> Result<(SnapshotMeta, Directory)> {
    let file = File::open(path)?;

    let builder = ParquetRecordBatchReaderBuilder::try_new(file)
        .map_err(|e| Error::new(ErrorKind::InvalidData, e))?;

    let mut reader = builder
        .build()
        .map_err(|e| Error::new(ErrorKind::InvalidData, e))?;

    let mut orgs = Vec::new();
    let mut employees = Vec::new();
    let mut meta: Option<SnapshotMeta> = None;

    for batch_result in &mut reader {
        let batch = batch_result.map_err(|e| Error::new(ErrorKind::InvalidData, e))?;

        for row in 0..batch.num_rows() {
            if get_string_value(&batch, "org_id", row)?.is_some() {
                orgs.push(extract_org(&batch, row)?);
            } else if get_string_value(&batch, "emp_id", row)?.is_some() {
                employees.push(extract_employee(&batch, row)?);
            } else if meta.is_none() && get_string_value(&batch, "meta_source", row)?.is_some() {
                meta = Some(extract_metadata(&batch, row)?);
            }
        }
    }

    let meta = meta.ok_or_else(|| Error::new(ErrorKind::InvalidData, "No metadata found"))?;

    Ok((meta, Directory::new(orgs, employees)))
}

fn strings<'a>(values: impl Iterator<Item = &'a str>) -> ArrayRef {
    Arc::new(StringArray::from(values.map(Some).collect::<Vec<_>>()))
}

/// Assemble a batch from the populated columns; every other column is null.
fn build_batch(
    schema: &Arc<Schema>,
    len: usize,
    mut populated: HashMap<&'static str, ArrayRef>,
) -> Result<RecordBatch> {
    let columns = schema
        .fields()
        .iter()
        .map(|field| {
            populated
                .remove(field.name().as_str())
                .unwrap_or_else(|| new_null_array(field.data_type(), len))
        })
        .collect::<Vec<_>>();

    RecordBatch::try_new(schema.clone(), columns).map_err(Error::other)
}

pub fn create_orgs_batch(schema: &Arc<Schema>, orgs: &[OrgUnit]) -> Result<RecordBatch> {
    let mut columns: HashMap<&'static str, ArrayRef> = HashMap::new();
    columns.insert("org_id", strings(orgs.iter().map(|o| o.org_id.as_str())));
    columns.insert("org_name", strings(orgs.iter().map(|o| o.org_name.as_str())));
    columns.insert(
        "org_full_name",
        strings(orgs.iter().map(|o| o.org_full_name.as_str())),
    );
    columns.insert(
        "org_parent_id",
        strings(orgs.iter().map(|o| o.parent_id.as_str())),
    );
    columns.insert(
        "org_sort_code",
        strings(orgs.iter().map(|o| o.sort_code.as_str())),
    );
    columns.insert(
        "org_company_code",
        strings(orgs.iter().map(|o| o.company_code.as_str())),
    );
    columns.insert(
        "org_level",
        Arc::new(UInt32Array::from(
            orgs.iter().map(|o| Some(o.org_level)).collect::<Vec<_>>(),
        )),
    );

    build_batch(schema, orgs.len(), columns)
}

pub fn create_employees_batch(
    schema: &Arc<Schema>,
    employees: &[Employee],
) -> Result<RecordBatch> {
    let field = |name: &str, emp: &Employee| -> String {
        match name {
            "emp_id" => emp.id.clone(),
            "emp_name" => emp.name.clone(),
            "emp_position" => emp.position.clone(),
            "emp_role" => emp.role.clone(),
            "emp_department" => emp.department.clone(),
            "emp_org_full_name" => emp.org_full_name.clone(),
            "emp_org_id" => emp.org_id.clone(),
            "emp_extension" => emp.extension.clone(),
            "emp_mobile" => emp.mobile.clone(),
            "emp_email" => emp.email.clone(),
            "emp_company_name" => emp.company_name.clone(),
            "emp_company_code" => emp.company_code.clone(),
            _ => emp.description.clone(),
        }
    };

    let mut columns: HashMap<&'static str, ArrayRef> = HashMap::new();
    for name in EMP_STRING_COLUMNS {
        let values: Vec<String> = employees.iter().map(|emp| field(name, emp)).collect();
        columns.insert(name, strings(values.iter().map(String::as_str)));
    }

    build_batch(schema, employees.len(), columns)
}

pub fn create_metadata_batch(schema: &Arc<Schema>, meta: &SnapshotMeta) -> Result<RecordBatch> {
    let mut columns: HashMap<&'static str, ArrayRef> = HashMap::new();
    columns.insert("meta_source", strings(std::iter::once(meta.source.as_str())));
    columns.insert(
        "meta_exported_at",
        strings(std::iter::once(meta.exported_at.as_str())),
    );
    columns.insert(
        "meta_org_count",
        Arc::new(UInt64Array::from(vec![Some(meta.org_count)])),
    );
    columns.insert(
        "meta_employee_count",
        Arc::new(UInt64Array::from(vec![Some(meta.employee_count)])),
    );

    build_batch(schema, 1, columns)
}

fn required(batch: &RecordBatch, col_name: &str, row: usize) -> Result<String> {
    get_string_value(batch, col_name, row)?.ok_or_else(|| {
        Error::new(ErrorKind::InvalidData, format!("Missing {col_name}"))
    })
}

fn extract_org(batch: &RecordBatch, row: usize) -> Result<OrgUnit> {
    let org_level = get_u32_value(batch, "org_level", row)?
        .ok_or_else(|| Error::new(ErrorKind::InvalidData, "Missing org_level"))?;

    Ok(OrgUnit {
        org_id: required(batch, "org_id", row)?,
        org_name: required(batch, "org_name", row)?,
        org_full_name: required(batch, "org_full_name", row)?,
        org_level,
        parent_id: required(batch, "org_parent_id", row)?,
        sort_code: required(batch, "org_sort_code", row)?,
        company_code: required(batch, "org_company_code", row)?,
    })
}

fn extract_employee(batch: &RecordBatch, row: usize) -> Result<Employee> {
    Ok(Employee {
        id: required(batch, "emp_id", row)?,
        name: required(batch, "emp_name", row)?,
        position: required(batch, "emp_position", row)?,
        role: required(batch, "emp_role", row)?,
        department: required(batch, "emp_department", row)?,
        org_full_name: required(batch, "emp_org_full_name", row)?,
        org_id: required(batch, "emp_org_id", row)?,
        extension: required(batch, "emp_extension", row)?,
        mobile: required(batch, "emp_mobile", row)?,
        email: required(batch, "emp_email", row)?,
        company_name: required(batch, "emp_company_name", row)?,
        company_code: required(batch, "emp_company_code", row)?,
        description: required(batch, "emp_description", row)?,
    })
}

fn extract_metadata(batch: &RecordBatch, row: usize) -> Result<SnapshotMeta> {
    Ok(SnapshotMeta {
        source: required(batch, "meta_source", row)?,
        exported_at: required(batch, "meta_exported_at", row)?,
        org_count: get_u64_value(batch, "meta_org_count", row)?.unwrap_or(0),
        employee_count: get_u64_value(batch, "meta_employee_count", row)?.unwrap_or(0),
    })
}

fn typed_column<'a, A: Array + 'static>(batch: &'a RecordBatch, col_name: &str) -> Result<&'a A> {
    let col = batch.column_by_name(col_name).ok_or_else(|| {
        Error::new(
            ErrorKind::InvalidData,
            format!("Missing column: {col_name}"),
        )
    })?;

    col.as_any().downcast_ref::<A>().ok_or_else(|| {
        Error::new(
            ErrorKind::InvalidData,
            format!("Invalid type for: {col_name}"),
        )
    })
}

fn get_string_value(batch: &RecordBatch, col_name: &str, row: usize) -> Result<Option<String>> {
    let array = typed_column::<StringArray>(batch, col_name)?;
    if array.is_null(row) {
        Ok(None)
    } else {
        Ok(Some(array.value(row).to_string()))
    }
}

fn get_u32_value(batch: &RecordBatch, col_name: &str, row: usize) -> Result<Option<u32>> {
    let array = typed_column::<UInt32Array>(batch, col_name)?;
    if array.is_null(row) {
        Ok(None)
    } else {
        Ok(Some(array.value(row)))
    }
}

fn get_u64_value(batch: &RecordBatch, col_name: &str, row: usize) -> Result<Option<u64>> {
    let array = typed_column::<UInt64Array>(batch, col_name)?;
    if array.is_null(row) {
        Ok(None)
    } else {
        Ok(Some(array.value(row)))
    }
}
