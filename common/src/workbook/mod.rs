//! xlsx 패키지 모델
//!
//! 템플릿 통합문서를 열어 셀 값만 바꾸고 다시 저장하기 위한 최소한의 모델.
//! 서식(styles.xml), 테마, 병합 영역, 인쇄 설정 등은 건드리지 않고 원문 그대로
//! 다시 쓴다. 수식 재계산은 하지 않으며 calcChain은 항상 제거한다.

pub mod address;
mod parts;
mod sheet;

pub use sheet::{CellValue, Worksheet};

use crate::error::{Error, Result};
use parts::{
    add_override, is_rel_kind, next_rel_id, parse_relationships, parse_shared_strings,
    rels_path_for, relative_target, remove_override, render_relationships, resolve_target,
    Relationship, SheetEntry, WorkbookXml, CONTENT_TYPES_PART, ROOT_RELS_PART,
    WORKSHEET_CONTENT_TYPE, WORKSHEET_REL_TYPE,
};
use std::collections::HashMap;
use std::io::{Cursor, Read, Write};
use zip::write::SimpleFileOptions;
use zip::{CompressionMethod, ZipArchive, ZipWriter};

/// Excel 시트 이름 최대 길이
pub const MAX_SHEET_NAME_LEN: usize = 31;

/// 복사본에 따라가지 않는 시트 관계
const UNSHARED_SHEET_RELS: &[&str] = &[
    "drawing",
    "vmlDrawing",
    "comments",
    "table",
    "threadedComment",
];

#[derive(Debug, Clone)]
struct SheetSlot {
    entry: SheetEntry,
    part: String,
    /// 차트 시트 등 워크시트가 아닌 시트는 None (원문 유지)
    sheet: Option<Worksheet>,
}

/// 메모리 위의 xlsx 통합문서
#[derive(Debug, Clone)]
pub struct Workbook {
    /// zip 안의 파트 순서
    order: Vec<String>,
    /// 원문 그대로 다시 쓰는 파트
    parts: HashMap<String, Vec<u8>>,
    workbook_part: String,
    workbook_xml: WorkbookXml,
    relationships: Vec<Relationship>,
    content_types: String,
    sheets: Vec<SheetSlot>,
    structure_changed: bool,
}

impl Workbook {
    /// xlsx 바이트열에서 읽기
    pub fn from_bytes(bytes: &[u8]) -> Result<Self> {
        let mut archive = ZipArchive::new(Cursor::new(bytes))?;
        let mut order = Vec::with_capacity(archive.len());
        let mut parts = HashMap::with_capacity(archive.len());

        for i in 0..archive.len() {
            let mut file = archive.by_index(i)?;
            if file.is_dir() {
                continue;
            }
            let mut data = Vec::with_capacity(file.size() as usize);
            file.read_to_end(&mut data)?;
            order.push(file.name().to_string());
            parts.insert(file.name().to_string(), data);
        }

        let workbook_part = find_workbook_part(&parts)?;
        let workbook_xml = WorkbookXml::parse(&part_text(&parts, &workbook_part)?)?;
        let rels_part = rels_path_for(&workbook_part);
        let mut relationships = parse_relationships(&part_text(&parts, &rels_part)?)?;
        let mut content_types = part_text(&parts, CONTENT_TYPES_PART)?;

        // calcChain은 셀 구성이 바뀌면 맞지 않으므로 버린다
        relationships.retain(|rel| {
            if !is_rel_kind(&rel.rel_type, "calcChain") {
                return true;
            }
            let part = resolve_target(&workbook_part, &rel.target);
            content_types = remove_override(&content_types, &format!("/{}", part));
            parts.remove(&part);
            order.retain(|name| name != &part);
            false
        });

        let shared_strings = match relationships
            .iter()
            .find(|rel| is_rel_kind(&rel.rel_type, "sharedStrings"))
        {
            Some(rel) => {
                let part = resolve_target(&workbook_part, &rel.target);
                match parts.get(&part) {
                    Some(_) => parse_shared_strings(&part_text(&parts, &part)?)?,
                    None => Vec::new(),
                }
            }
            None => Vec::new(),
        };

        let mut sheets = Vec::with_capacity(workbook_xml.sheets.len());
        for entry in &workbook_xml.sheets {
            let rel = relationships
                .iter()
                .find(|rel| rel.id == entry.rel_id)
                .ok_or_else(|| Error::Parse(format!("시트 '{}'의 관계({})가 없습니다", entry.name, entry.rel_id)))?;
            let part = resolve_target(&workbook_part, &rel.target);

            let sheet = if is_rel_kind(&rel.rel_type, "worksheet") {
                let xml = part_text(&parts, &part)?;
                Some(Worksheet::parse(&entry.name, &xml, &shared_strings)?)
            } else {
                None
            };
            sheets.push(SheetSlot { entry: entry.clone(), part, sheet });
        }

        tracing::debug!("통합문서 읽기: 파트 {}개, 시트 {}개", order.len(), sheets.len());

        Ok(Self {
            order,
            parts,
            workbook_part,
            workbook_xml,
            relationships,
            content_types,
            sheets,
            structure_changed: false,
        })
    }

    /// xlsx 바이트열로 쓰기
    pub fn to_bytes(&self) -> Result<Vec<u8>> {
        let mut workbook_xml = self.workbook_xml.clone();
        workbook_xml.sheets = self.sheets.iter().map(|slot| slot.entry.clone()).collect();

        let rels_part = rels_path_for(&self.workbook_part);
        let sheet_parts: HashMap<&str, &Worksheet> = self
            .sheets
            .iter()
            .filter_map(|slot| slot.sheet.as_ref().map(|sheet| (slot.part.as_str(), sheet)))
            .collect();

        let mut zip = ZipWriter::new(Cursor::new(Vec::new()));
        let options = SimpleFileOptions::default().compression_method(CompressionMethod::Deflated);

        for name in &self.order {
            let data: Vec<u8> = if name == CONTENT_TYPES_PART {
                self.content_types.clone().into_bytes()
            } else if *name == self.workbook_part {
                workbook_xml.render(self.structure_changed).into_bytes()
            } else if *name == rels_part {
                render_relationships(&self.relationships).into_bytes()
            } else if let Some(sheet) = sheet_parts.get(name.as_str()) {
                sheet.to_xml().into_bytes()
            } else if let Some(raw) = self.parts.get(name) {
                raw.clone()
            } else {
                continue;
            };

            zip.start_file(name.as_str(), options)?;
            zip.write_all(&data)?;
        }

        Ok(zip.finish()?.into_inner())
    }

    /// 시트 이름 목록 (탭 순서)
    pub fn sheet_names(&self) -> Vec<&str> {
        self.sheets.iter().map(|slot| slot.entry.name.as_str()).collect()
    }

    pub fn sheet(&self, name: &str) -> Option<&Worksheet> {
        self.sheets
            .iter()
            .find(|slot| slot.entry.name == name)
            .and_then(|slot| slot.sheet.as_ref())
    }

    pub fn sheet_mut(&mut self, name: &str) -> Option<&mut Worksheet> {
        self.sheets
            .iter_mut()
            .find(|slot| slot.entry.name == name)
            .and_then(|slot| slot.sheet.as_mut())
    }

    /// 모든 워크시트 (탭 순서)
    pub fn worksheets_mut(&mut self) -> impl Iterator<Item = &mut Worksheet> {
        self.sheets.iter_mut().filter_map(|slot| slot.sheet.as_mut())
    }

    /// 시트를 복사해 맨 뒤에 추가
    ///
    /// 값・서식・병합 영역・인쇄 영역은 복사되고, 그림/메모/표는 복사되지 않는다.
    ///
    /// # Arguments
    /// * `source` - 원본 시트 이름
    /// * `new_name` - 새 시트 이름 (중복 불가)
    pub fn duplicate_sheet(&mut self, source: &str, new_name: &str) -> Result<()> {
        if self.sheets.iter().any(|slot| slot.entry.name == new_name) {
            return Err(Error::Parse(format!("이미 있는 시트 이름입니다: {}", new_name)));
        }
        let source_index = self
            .sheets
            .iter()
            .position(|slot| slot.entry.name == source && slot.sheet.is_some())
            .ok_or_else(|| Error::SheetNotFound(source.to_string()))?;
        let source_slot = &self.sheets[source_index];
        let sheet = match &source_slot.sheet {
            Some(sheet) => sheet.duplicate(),
            None => return Err(Error::SheetNotFound(source.to_string())),
        };
        let source_part = source_slot.part.clone();

        let part = self.next_sheet_part();
        let rel_id = next_rel_id(&self.relationships);
        let sheet_id = self.sheets.iter().map(|slot| slot.entry.sheet_id).max().unwrap_or(0) + 1;

        // 시트 관계 (인쇄 설정, 외부 링크 등). 대상 경로는 같은 폴더 기준이라 그대로 쓴다.
        if let Some(raw) = self.parts.get(&rels_path_for(&source_part)) {
            let rels: Vec<Relationship> = parse_relationships(&String::from_utf8_lossy(raw))?
                .into_iter()
                .filter(|rel| !UNSHARED_SHEET_RELS.iter().any(|kind| is_rel_kind(&rel.rel_type, kind)))
                .collect();
            if !rels.is_empty() {
                let rels_part = rels_path_for(&part);
                self.parts.insert(rels_part.clone(), render_relationships(&rels).into_bytes());
                self.order.push(rels_part);
            }
        }

        self.relationships.push(Relationship {
            id: rel_id.clone(),
            rel_type: WORKSHEET_REL_TYPE.to_string(),
            target: relative_target(&self.workbook_part, &part),
            target_mode: None,
        });
        self.content_types = add_override(&self.content_types, &format!("/{}", part), WORKSHEET_CONTENT_TYPE);

        let new_index = self.sheets.len();
        let scoped: Vec<_> = self
            .workbook_xml
            .defined_names
            .iter()
            .filter(|dn| dn.local_sheet_id == Some(source_index))
            .map(|dn| dn.retarget(source, new_name, new_index))
            .collect();
        self.workbook_xml.defined_names.extend(scoped);

        self.order.push(part.clone());
        self.sheets.push(SheetSlot {
            entry: SheetEntry {
                name: new_name.to_string(),
                sheet_id,
                rel_id,
                state: None,
            },
            part,
            sheet: Some(sheet),
        });
        self.structure_changed = true;
        Ok(())
    }

    /// 시트 삭제 (파트, 관계, 콘텐츠 형식, 시트 범위의 이름 포함)
    pub fn remove_sheet(&mut self, name: &str) -> Result<()> {
        let index = self
            .sheets
            .iter()
            .position(|slot| slot.entry.name == name)
            .ok_or_else(|| Error::SheetNotFound(name.to_string()))?;
        let slot = self.sheets.remove(index);

        self.relationships.retain(|rel| rel.id != slot.entry.rel_id);
        self.content_types = remove_override(&self.content_types, &format!("/{}", slot.part));
        let rels_part = rels_path_for(&slot.part);
        self.parts.remove(&slot.part);
        self.parts.remove(&rels_part);
        self.order.retain(|part| *part != slot.part && *part != rels_part);

        self.workbook_xml.defined_names.retain(|dn| dn.local_sheet_id != Some(index));
        for dn in &mut self.workbook_xml.defined_names {
            if let Some(id) = dn.local_sheet_id {
                if id > index {
                    dn.local_sheet_id = Some(id - 1);
                }
            }
        }

        if index == 0 {
            // 첫 시트만 탭 선택 상태로 남긴다
            for worksheet in self.sheets.iter_mut().skip(1).filter_map(|s| s.sheet.as_mut()) {
                worksheet.clear_tab_selected();
            }
        }
        self.structure_changed = true;
        Ok(())
    }

    fn next_sheet_part(&self) -> String {
        let dir = match self.workbook_part.rsplit_once('/') {
            Some((dir, _)) => format!("{}/worksheets", dir),
            None => "worksheets".to_string(),
        };
        let taken = |candidate: &str| {
            self.order.iter().any(|part| part == candidate)
                || self.sheets.iter().any(|slot| slot.part == candidate)
        };
        (1..)
            .map(|n| format!("{}/sheet{}.xml", dir, n))
            .find(|candidate| !taken(candidate))
            .unwrap_or_else(|| format!("{}/sheet.xml", dir))
    }
}

/// 시트 이름에 쓸 수 없는 문자를 바꾸고 31자로 자른다
pub fn sanitize_sheet_name(name: &str) -> String {
    let cleaned: String = name
        .trim()
        .chars()
        .map(|c| match c {
            '[' | ']' | ':' | '*' | '?' | '/' | '\\' => '_',
            _ => c,
        })
        .take(MAX_SHEET_NAME_LEN)
        .collect();
    let cleaned = cleaned.trim_matches('\'').to_string();
    if cleaned.is_empty() {
        "Sheet".to_string()
    } else {
        cleaned
    }
}

fn part_text(parts: &HashMap<String, Vec<u8>>, name: &str) -> Result<String> {
    let data = parts
        .get(name)
        .ok_or_else(|| Error::Parse(format!("{} 파트가 없습니다", name)))?;
    String::from_utf8(data.clone()).map_err(|e| Error::Parse(format!("{}: {}", name, e)))
}

fn find_workbook_part(parts: &HashMap<String, Vec<u8>>) -> Result<String> {
    if parts.contains_key(ROOT_RELS_PART) {
        let rels = parse_relationships(&part_text(parts, ROOT_RELS_PART)?)?;
        if let Some(rel) = rels.iter().find(|rel| is_rel_kind(&rel.rel_type, "officeDocument")) {
            return Ok(resolve_target("", &rel.target));
        }
    }
    if parts.contains_key("xl/workbook.xml") {
        return Ok("xl/workbook.xml".to_string());
    }
    Err(Error::Parse("통합문서 파트(xl/workbook.xml)를 찾을 수 없습니다".to_string()))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_support::{build_workbook, SheetSpec};
    use calamine::{open_workbook_from_rs, Data, Reader as _, Xlsx};

    fn read_back(bytes: Vec<u8>) -> Xlsx<Cursor<Vec<u8>>> {
        open_workbook_from_rs(Cursor::new(bytes)).expect("calamine으로 다시 열기 실패")
    }

    fn contract_template() -> Vec<u8> {
        build_workbook(&[SheetSpec::new("계약서")
            .text(9, 3, "성 명")
            .text(11, 3, "연락처 : 010-0000-0000")
            .merge(9, 3, 9, 5)
            .print_area(1, 1, 66, 16)])
    }

    #[test]
    fn test_round_trip_keeps_values() {
        let bytes = build_workbook(&[
            SheetSpec::new("관리자").text(1, 22, "2023년 05월 작업일보").number(3, 28, 45047.0),
            SheetSpec::new("노무비").text(10, 2, "홍길동"),
        ]);

        let wb = Workbook::from_bytes(&bytes).unwrap();
        assert_eq!(wb.sheet_names(), vec!["관리자", "노무비"]);
        let admin = wb.sheet("관리자").unwrap();
        assert_eq!(admin.text(1, 22), Some("2023년 05월 작업일보"));
        assert_eq!(admin.value(3, 28).as_number(), Some(45047.0));

        let mut xlsx = read_back(wb.to_bytes().unwrap());
        let range = xlsx.worksheet_range("노무비").unwrap();
        assert_eq!(range.get_value((9, 1)), Some(&Data::String("홍길동".to_string())));
    }

    #[test]
    fn test_edit_cells() {
        let bytes = build_workbook(&[SheetSpec::new("관리자").text(1, 22, "2023년 05월 작업일보")]);
        let mut wb = Workbook::from_bytes(&bytes).unwrap();

        let admin = wb.sheet_mut("관리자").unwrap();
        admin.set_text(1, 22, "2024년 07월 작업일보");
        admin.set_number(9, 1, 1.0);

        let mut xlsx = read_back(wb.to_bytes().unwrap());
        let range = xlsx.worksheet_range("관리자").unwrap();
        assert_eq!(range.get_value((0, 21)), Some(&Data::String("2024년 07월 작업일보".to_string())));
        assert_eq!(range.get_value((8, 0)), Some(&Data::Float(1.0)));
    }

    #[test]
    fn test_duplicate_and_remove_sheet() {
        let mut wb = Workbook::from_bytes(&contract_template()).unwrap();

        wb.duplicate_sheet("계약서", "홍길동").unwrap();
        wb.duplicate_sheet("계약서", "김철수").unwrap();
        wb.sheet_mut("홍길동").unwrap().set_text(9, 3, "홍 길 동");
        wb.remove_sheet("계약서").unwrap();

        assert_eq!(wb.sheet_names(), vec!["홍길동", "김철수"]);
        let copy = wb.sheet("김철수").unwrap();
        assert_eq!(copy.text(9, 3), Some("성 명"));
        assert_eq!(copy.merges().to_vec(), vec!["C9:E9".to_string()]);

        // 다시 읽어도 구조가 유지되어야 한다
        let bytes = wb.to_bytes().unwrap();
        let reread = Workbook::from_bytes(&bytes).unwrap();
        assert_eq!(reread.sheet_names(), vec!["홍길동", "김철수"]);
        assert_eq!(reread.sheet("홍길동").unwrap().text(9, 3), Some("홍 길 동"));
        assert_eq!(reread.sheet("김철수").unwrap().merges().to_vec(), vec!["C9:E9".to_string()]);

        let names: Vec<_> = reread
            .workbook_xml
            .defined_names
            .iter()
            .map(|dn| (dn.local_sheet_id, dn.value.clone()))
            .collect();
        assert_eq!(
            names,
            vec![
                (Some(0), "'홍길동'!$A$1:$P$66".to_string()),
                (Some(1), "'김철수'!$A$1:$P$66".to_string()),
            ]
        );

        let mut xlsx = read_back(bytes);
        assert_eq!(xlsx.sheet_names(), vec!["홍길동".to_string(), "김철수".to_string()]);
        let range = xlsx.worksheet_range("홍길동").unwrap();
        assert_eq!(range.get_value((8, 2)), Some(&Data::String("홍 길 동".to_string())));
    }

    #[test]
    fn test_remove_all_sheets() {
        let mut wb = Workbook::from_bytes(&contract_template()).unwrap();
        wb.remove_sheet("계약서").unwrap();
        assert!(wb.sheet_names().is_empty());

        let reread = Workbook::from_bytes(&wb.to_bytes().unwrap()).unwrap();
        assert!(reread.sheet_names().is_empty());
    }

    #[test]
    fn test_duplicate_errors() {
        let mut wb = Workbook::from_bytes(&contract_template()).unwrap();
        assert!(matches!(wb.duplicate_sheet("없는시트", "a"), Err(Error::SheetNotFound(_))));
        assert!(matches!(wb.duplicate_sheet("계약서", "계약서"), Err(Error::Parse(_))));
        assert!(matches!(wb.remove_sheet("없는시트"), Err(Error::SheetNotFound(_))));
    }

    #[test]
    fn test_not_a_workbook() {
        assert!(Workbook::from_bytes(b"not a zip file").is_err());
    }

    #[test]
    fn test_sanitize_sheet_name() {
        assert_eq!(sanitize_sheet_name("홍길동"), "홍길동");
        assert_eq!(sanitize_sheet_name("a/b:c"), "a_b_c");
        assert_eq!(sanitize_sheet_name(&"가".repeat(40)).chars().count(), 31);
        assert_eq!(sanitize_sheet_name("  "), "Sheet");
    }
}
