use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

/// One key/value entry belonging to a dictionary type.
///
/// `dict_code` is assigned server-side; `None` signals a record that does
/// not exist on the server yet. `create_time` is server-assigned and
/// immutable.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DictDataRecord {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub dict_code: Option<i64>,
    pub dict_type: String,
    pub dict_label: String,
    pub dict_value: String,
    pub dict_sort: i64,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub remark: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub create_time: Option<String>,
}

impl DictDataRecord {
    /// Whether the record exists server-side
    pub fn is_persisted(&self) -> bool {
        self.dict_code.is_some()
    }
}

/// A named category grouping related dictionary-data entries.
///
/// Only consumed to build the `dict_type -> dict_name` mapping behind the
/// search form's type selector.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DictTypeRecord {
    pub dict_type: String,
    pub dict_name: String,
}

/// One page of rows plus the server-side total, as the table consumes it
#[derive(Debug, Clone, Deserialize)]
pub struct Page<T> {
    pub rows: Vec<T>,
    pub total: u64,
}

impl<T> Page<T> {
    pub fn empty() -> Self {
        Self {
            rows: Vec::new(),
            total: 0,
        }
    }
}

/// Filter fields entered in the search form.
///
/// The createTime range is carried as two optional bounds and expanded
/// into discrete `beginTime`/`endTime` query parameters on the wire; both
/// are omitted entirely when unset.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ListFilter {
    pub dict_type: Option<String>,
    pub dict_label: Option<String>,
    pub dict_value: Option<String>,
    pub created_from: Option<NaiveDate>,
    pub created_to: Option<NaiveDate>,
}

impl ListFilter {
    /// Expand the filter into query parameters for the list and export
    /// endpoints. Empty fields produce no parameter at all.
    pub fn to_params(&self) -> Vec<(String, String)> {
        let mut params = Vec::new();
        if let Some(ref dict_type) = self.dict_type {
            params.push(("dictType".to_string(), dict_type.clone()));
        }
        if let Some(ref dict_label) = self.dict_label {
            params.push(("dictLabel".to_string(), dict_label.clone()));
        }
        if let Some(ref dict_value) = self.dict_value {
            params.push(("dictValue".to_string(), dict_value.clone()));
        }
        if let Some(from) = self.created_from {
            params.push(("beginTime".to_string(), from.format("%Y-%m-%d").to_string()));
        }
        if let Some(to) = self.created_to {
            params.push(("endTime".to_string(), to.format("%Y-%m-%d").to_string()));
        }
        params
    }

    pub fn is_empty(&self) -> bool {
        self.dict_type.is_none()
            && self.dict_label.is_none()
            && self.dict_value.is_none()
            && self.created_from.is_none()
            && self.created_to.is_none()
    }
}

/// Pagination plus filter, sent on every table reload
#[derive(Debug, Clone, PartialEq)]
pub struct ListQuery {
    /// 1-based page number
    pub page_num: u64,
    pub page_size: u64,
    pub filter: ListFilter,
}

impl ListQuery {
    pub fn new(page_size: u64) -> Self {
        Self {
            page_num: 1,
            page_size,
            filter: ListFilter::default(),
        }
    }

    pub fn to_params(&self) -> Vec<(String, String)> {
        let mut params = vec![
            ("pageNum".to_string(), self.page_num.to_string()),
            ("pageSize".to_string(), self.page_size.to_string()),
        ];
        params.extend(self.filter.to_params());
        params
    }
}

/// Edited fields from the modal form.
///
/// Explicit patch with defined precedence instead of an untyped field
/// merge: on update, patch fields overwrite the previously loaded record
/// and everything else is carried over unchanged.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct RecordPatch {
    pub dict_type: Option<String>,
    pub dict_label: Option<String>,
    pub dict_value: Option<String>,
    pub dict_sort: Option<i64>,
    pub remark: Option<String>,
}

impl RecordPatch {
    /// Overlay the patch over a previously loaded record, patch fields
    /// taking precedence. Identity and createTime come from the base.
    pub fn merge_into(&self, base: &DictDataRecord) -> DictDataRecord {
        DictDataRecord {
            dict_code: base.dict_code,
            dict_type: self.dict_type.clone().unwrap_or_else(|| base.dict_type.clone()),
            dict_label: self
                .dict_label
                .clone()
                .unwrap_or_else(|| base.dict_label.clone()),
            dict_value: self
                .dict_value
                .clone()
                .unwrap_or_else(|| base.dict_value.clone()),
            dict_sort: self.dict_sort.unwrap_or(base.dict_sort),
            remark: self.remark.clone().or_else(|| base.remark.clone()),
            create_time: base.create_time.clone(),
        }
    }

    /// Build a candidate record for the create flow. No dictCode: the
    /// server assigns identity.
    pub fn into_record(self) -> DictDataRecord {
        DictDataRecord {
            dict_code: None,
            dict_type: self.dict_type.unwrap_or_default(),
            dict_label: self.dict_label.unwrap_or_default(),
            dict_value: self.dict_value.unwrap_or_default(),
            dict_sort: self.dict_sort.unwrap_or(0),
            remark: self.remark,
            create_time: None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample_record() -> DictDataRecord {
        DictDataRecord {
            dict_code: Some(7),
            dict_type: "sys_status".to_string(),
            dict_label: "Active".to_string(),
            dict_value: "1".to_string(),
            dict_sort: 2,
            remark: Some("enabled state".to_string()),
            create_time: Some("2024-03-01 09:30:00".to_string()),
        }
    }

    #[test]
    fn test_date_range_expands_into_two_bound_params() {
        let filter = ListFilter {
            created_from: NaiveDate::from_ymd_opt(2024, 1, 1),
            created_to: NaiveDate::from_ymd_opt(2024, 3, 31),
            ..Default::default()
        };
        let params = filter.to_params();
        assert!(params.contains(&("beginTime".to_string(), "2024-01-01".to_string())));
        assert!(params.contains(&("endTime".to_string(), "2024-03-31".to_string())));
    }

    #[test]
    fn test_empty_date_range_is_omitted() {
        let filter = ListFilter {
            dict_type: Some("sys_status".to_string()),
            ..Default::default()
        };
        let params = filter.to_params();
        assert!(params.iter().all(|(k, _)| k != "beginTime" && k != "endTime"));
        assert_eq!(params, vec![("dictType".to_string(), "sys_status".to_string())]);
    }

    #[test]
    fn test_list_query_carries_pagination_and_filter() {
        let mut query = ListQuery::new(10);
        query.page_num = 3;
        query.filter.dict_label = Some("Active".to_string());
        let params = query.to_params();
        assert_eq!(params[0], ("pageNum".to_string(), "3".to_string()));
        assert_eq!(params[1], ("pageSize".to_string(), "10".to_string()));
        assert!(params.contains(&("dictLabel".to_string(), "Active".to_string())));
    }

    #[test]
    fn test_patch_fields_take_precedence_on_merge() {
        let base = sample_record();
        let patch = RecordPatch {
            dict_label: Some("Enabled".to_string()),
            dict_sort: Some(9),
            ..Default::default()
        };
        let merged = patch.merge_into(&base);
        assert_eq!(merged.dict_label, "Enabled");
        assert_eq!(merged.dict_sort, 9);
        // untouched fields carry over, identity and createTime included
        assert_eq!(merged.dict_code, Some(7));
        assert_eq!(merged.dict_value, "1");
        assert_eq!(merged.remark.as_deref(), Some("enabled state"));
        assert_eq!(merged.create_time, base.create_time);
    }

    #[test]
    fn test_new_record_has_no_dict_code() {
        let patch = RecordPatch {
            dict_type: Some("sys_status".to_string()),
            dict_label: Some("Active".to_string()),
            dict_value: Some("1".to_string()),
            ..Default::default()
        };
        let record = patch.into_record();
        assert!(!record.is_persisted());
        assert_eq!(record.dict_sort, 0);

        // absent dictCode must not appear on the wire
        let json = serde_json::to_value(&record).unwrap();
        assert!(json.get("dictCode").is_none());
        assert_eq!(json["dictType"], "sys_status");
    }
}
