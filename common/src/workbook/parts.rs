//! 패키지 부속 XML
//!
//! workbook.xml의 시트 목록・정의된 이름, 관계(.rels), `[Content_Types].xml`,
//! 공유 문자열 표를 다룬다.

use crate::error::{Error, Result};
use quick_xml::escape::{escape, partial_escape};
use quick_xml::events::{BytesStart, Event};
use quick_xml::Reader;
use regex::Regex;

pub(crate) const CONTENT_TYPES_PART: &str = "[Content_Types].xml";
pub(crate) const ROOT_RELS_PART: &str = "_rels/.rels";
pub(crate) const WORKSHEET_REL_TYPE: &str =
    "http://schemas.openxmlformats.org/officeDocument/2006/relationships/worksheet";
pub(crate) const WORKSHEET_CONTENT_TYPE: &str =
    "application/vnd.openxmlformats-officedocument.spreadsheetml.worksheet+xml";

const RELS_NAMESPACE: &str = "http://schemas.openxmlformats.org/package/2006/relationships";

lazy_static::lazy_static! {
    static ref ACTIVE_TAB_RE: Regex = Regex::new(r#"activeTab="\d+""#).unwrap();
    static ref FIRST_SHEET_RE: Regex = Regex::new(r#"\s+firstSheet="\d+""#).unwrap();
}

/// 관계 유형 URI의 마지막 부분이 `kind`인지
pub(crate) fn is_rel_kind(rel_type: &str, kind: &str) -> bool {
    rel_type.rsplit('/').next() == Some(kind)
}

/// "xl/workbook.xml" → "xl/_rels/workbook.xml.rels"
pub(crate) fn rels_path_for(part: &str) -> String {
    match part.rsplit_once('/') {
        Some((dir, file)) => format!("{}/_rels/{}.rels", dir, file),
        None => format!("_rels/{}.rels", part),
    }
}

fn part_dir(part: &str) -> &str {
    part.rsplit_once('/').map(|(dir, _)| dir).unwrap_or("")
}

/// 관계 대상 경로를 패키지 내 경로로 바꾼다
///
/// `base_part` 기준의 상대 경로(`worksheets/sheet1.xml`, `../media/a.png`)와
/// 절대 경로(`/xl/worksheets/sheet1.xml`)를 모두 처리한다.
pub(crate) fn resolve_target(base_part: &str, target: &str) -> String {
    let joined = match target.strip_prefix('/') {
        Some(absolute) => absolute.to_string(),
        None if part_dir(base_part).is_empty() => target.to_string(),
        None => format!("{}/{}", part_dir(base_part), target),
    };

    let mut segments: Vec<&str> = Vec::new();
    for segment in joined.split('/') {
        match segment {
            "" | "." => {}
            ".." => {
                segments.pop();
            }
            _ => segments.push(segment),
        }
    }
    segments.join("/")
}

/// `part`를 `base_part` 기준 관계 대상으로
pub(crate) fn relative_target(base_part: &str, part: &str) -> String {
    let dir = part_dir(base_part);
    if dir.is_empty() {
        return part.to_string();
    }
    match part.strip_prefix(dir).and_then(|rest| rest.strip_prefix('/')) {
        Some(rest) => rest.to_string(),
        None => format!("/{}", part),
    }
}

fn attr_string(e: &BytesStart, key: &[u8]) -> Result<Option<String>> {
    for attr in e.attributes() {
        let attr = attr?;
        if attr.key.as_ref() == key {
            return Ok(Some(attr.unescape_value()?.into_owned()));
        }
    }
    Ok(None)
}

/// 요소 이름 접두사 (`x:sheetData` → "x:")
pub(crate) fn element_prefix(e: &BytesStart) -> String {
    let name = e.name();
    let name = name.as_ref();
    match name.iter().rposition(|b| *b == b':') {
        Some(idx) => String::from_utf8_lossy(&name[..=idx]).into_owned(),
        None => String::new(),
    }
}

// ---- 공유 문자열 ----

/// `xl/sharedStrings.xml` 해석 (윗주 `rPh`는 제외)
pub(crate) fn parse_shared_strings(xml: &str) -> Result<Vec<String>> {
    let mut reader = Reader::from_str(xml);
    reader.config_mut().trim_text(false);

    let mut strings = Vec::new();
    let mut current: Option<String> = None;
    let mut open: Vec<Vec<u8>> = Vec::new();

    loop {
        match reader.read_event()? {
            Event::Start(e) => {
                let name = e.local_name().as_ref().to_vec();
                if name == b"si" {
                    current = Some(String::new());
                    open.clear();
                } else if current.is_some() {
                    open.push(name);
                }
            }
            Event::Empty(e) if e.local_name().as_ref() == b"si" => strings.push(String::new()),
            Event::End(e) => {
                if e.local_name().as_ref() == b"si" {
                    strings.push(current.take().unwrap_or_default());
                } else {
                    open.pop();
                }
            }
            Event::Text(t) => {
                if let Some(text) = current.as_mut() {
                    let in_phonetic = open.iter().any(|n| n == b"rPh");
                    if open.last().map(Vec::as_slice) == Some(b"t".as_slice()) && !in_phonetic {
                        text.push_str(&t.unescape()?);
                    }
                }
            }
            Event::Eof => break,
            _ => {}
        }
    }

    Ok(strings)
}

// ---- 관계 ----

#[derive(Debug, Clone, PartialEq)]
pub(crate) struct Relationship {
    pub id: String,
    pub rel_type: String,
    pub target: String,
    pub target_mode: Option<String>,
}

pub(crate) fn parse_relationships(xml: &str) -> Result<Vec<Relationship>> {
    let mut reader = Reader::from_str(xml);
    reader.config_mut().trim_text(true);

    let mut relationships = Vec::new();
    loop {
        match reader.read_event()? {
            Event::Start(e) | Event::Empty(e) if e.local_name().as_ref() == b"Relationship" => {
                let id = attr_string(&e, b"Id")?.unwrap_or_default();
                let rel_type = attr_string(&e, b"Type")?.unwrap_or_default();
                let target = attr_string(&e, b"Target")?.unwrap_or_default();
                let target_mode = attr_string(&e, b"TargetMode")?;
                relationships.push(Relationship { id, rel_type, target, target_mode });
            }
            Event::Eof => break,
            _ => {}
        }
    }

    Ok(relationships)
}

pub(crate) fn render_relationships(relationships: &[Relationship]) -> String {
    let mut out = String::from("<?xml version=\"1.0\" encoding=\"UTF-8\" standalone=\"yes\"?>\n");
    out.push_str(&format!("<Relationships xmlns=\"{}\">", RELS_NAMESPACE));
    for rel in relationships {
        out.push_str(&format!(
            "<Relationship Id=\"{}\" Type=\"{}\" Target=\"{}\"",
            escape(rel.id.as_str()),
            escape(rel.rel_type.as_str()),
            escape(rel.target.as_str())
        ));
        if let Some(mode) = &rel.target_mode {
            out.push_str(&format!(" TargetMode=\"{}\"", escape(mode.as_str())));
        }
        out.push_str("/>");
    }
    out.push_str("</Relationships>");
    out
}

/// 사용되지 않은 다음 rId
pub(crate) fn next_rel_id(relationships: &[Relationship]) -> String {
    let max = relationships
        .iter()
        .filter_map(|rel| rel.id.strip_prefix("rId"))
        .filter_map(|n| n.parse::<u32>().ok())
        .max()
        .unwrap_or(0);
    format!("rId{}", max + 1)
}

// ---- 콘텐츠 형식 ----

/// `<Override PartName=…>` 추가 (이미 있으면 그대로)
pub(crate) fn add_override(xml: &str, part_name: &str, content_type: &str) -> String {
    if xml.contains(&format!("PartName=\"{}\"", part_name)) {
        return xml.to_string();
    }
    let entry = format!("<Override PartName=\"{}\" ContentType=\"{}\"/>", part_name, content_type);
    match xml.rfind("</") {
        Some(at) => format!("{}{}{}", &xml[..at], entry, &xml[at..]),
        None => xml.to_string(),
    }
}

/// `<Override PartName=…/>` 제거
pub(crate) fn remove_override(xml: &str, part_name: &str) -> String {
    let needle = format!("PartName=\"{}\"", part_name);
    let span = xml.find(&needle).and_then(|at| {
        let start = xml[..at].rfind('<')?;
        let end = at + xml[at..].find("/>")? + 2;
        Some((start, end))
    });
    match span {
        Some((start, end)) => format!("{}{}", &xml[..start], &xml[end..]),
        None => xml.to_string(),
    }
}

// ---- workbook.xml ----

#[derive(Debug, Clone, PartialEq)]
pub(crate) struct SheetEntry {
    pub name: String,
    pub sheet_id: u32,
    pub rel_id: String,
    pub state: Option<String>,
}

/// `<definedName>` (인쇄 영역 등)
#[derive(Debug, Clone, PartialEq)]
pub(crate) struct DefinedName {
    pub name: String,
    pub local_sheet_id: Option<usize>,
    /// name, localSheetId 이외의 속성 (원문)
    pub attrs: Vec<(String, String)>,
    pub value: String,
}

impl DefinedName {
    /// 수식 안의 시트 참조를 바꾼 복사본
    pub fn retarget(&self, from_sheet: &str, to_sheet: &str, local_sheet_id: usize) -> Self {
        let quoted_to = format!("'{}'!", to_sheet.replace('\'', "''"));
        let value = self
            .value
            .replace(&format!("'{}'!", from_sheet.replace('\'', "''")), &quoted_to)
            .replace(&format!("{}!", from_sheet), &quoted_to);
        Self {
            local_sheet_id: Some(local_sheet_id),
            value,
            ..self.clone()
        }
    }
}

/// workbook.xml
///
/// `<sheets>`와 `<definedNames>`만 다시 쓰고 나머지는 원문을 유지한다.
#[derive(Debug, Clone)]
pub(crate) struct WorkbookXml {
    source: String,
    prefix: String,
    rel_id_attr: String,
    sheets_span: (usize, usize),
    names_span: Option<(usize, usize)>,
    pub sheets: Vec<SheetEntry>,
    pub defined_names: Vec<DefinedName>,
}

impl WorkbookXml {
    pub fn parse(xml: &str) -> Result<Self> {
        let mut reader = Reader::from_str(xml);
        reader.config_mut().trim_text(false);

        let mut prefix = String::new();
        let mut rel_id_attr = String::from("r:id");
        let mut sheets_span = None;
        let mut names_span = None;
        let mut sheets = Vec::new();
        let mut defined_names = Vec::new();

        loop {
            let start = reader.buffer_position() as usize;
            match reader.read_event()? {
                Event::Start(e) if e.local_name().as_ref() == b"sheets" => {
                    prefix = element_prefix(&e);
                    loop {
                        match reader.read_event()? {
                            Event::Start(s) | Event::Empty(s) if s.local_name().as_ref() == b"sheet" => {
                                let (entry, attr_key) = parse_sheet_entry(&s)?;
                                if let Some(key) = attr_key {
                                    rel_id_attr = key;
                                }
                                sheets.push(entry);
                            }
                            Event::End(s) if s.local_name().as_ref() == b"sheets" => break,
                            Event::Eof => {
                                return Err(Error::Parse("sheets가 닫히지 않았습니다".to_string()))
                            }
                            _ => {}
                        }
                    }
                    sheets_span = Some((start, reader.buffer_position() as usize));
                }
                Event::Empty(e) if e.local_name().as_ref() == b"sheets" => {
                    prefix = element_prefix(&e);
                    sheets_span = Some((start, reader.buffer_position() as usize));
                }
                Event::Start(e) if e.local_name().as_ref() == b"definedNames" => {
                    defined_names = parse_defined_names(&mut reader)?;
                    names_span = Some((start, reader.buffer_position() as usize));
                }
                Event::Eof => break,
                _ => {}
            }
        }

        let sheets_span =
            sheets_span.ok_or_else(|| Error::Parse("workbook.xml에 sheets가 없습니다".to_string()))?;

        Ok(Self {
            source: xml.to_string(),
            prefix,
            rel_id_attr,
            sheets_span,
            names_span,
            sheets,
            defined_names,
        })
    }

    /// # Arguments
    /// * `reset_active_tab` - 시트 구성이 바뀌었으면 첫 시트를 활성 탭으로
    pub fn render(&self, reset_active_tab: bool) -> String {
        let src = &self.source;
        let mut out = String::with_capacity(src.len() + self.sheets.len() * 96);
        out.push_str(&src[..self.sheets_span.0]);
        out.push_str(&self.render_sheets());

        match self.names_span {
            Some((start, end)) if start >= self.sheets_span.1 => {
                out.push_str(&src[self.sheets_span.1..start]);
                out.push_str(&self.render_defined_names());
                out.push_str(&src[end..]);
            }
            _ => out.push_str(&src[self.sheets_span.1..]),
        }

        if reset_active_tab {
            let out = ACTIVE_TAB_RE.replace_all(&out, r#"activeTab="0""#);
            return FIRST_SHEET_RE.replace_all(&out, "").into_owned();
        }
        out
    }

    fn render_sheets(&self) -> String {
        let p = &self.prefix;
        if self.sheets.is_empty() {
            return format!("<{p}sheets/>");
        }
        let mut out = format!("<{p}sheets>");
        for sheet in &self.sheets {
            out.push_str(&format!(
                "<{p}sheet name=\"{}\" sheetId=\"{}\"",
                escape(sheet.name.as_str()),
                sheet.sheet_id
            ));
            if let Some(state) = &sheet.state {
                out.push_str(&format!(" state=\"{}\"", escape(state.as_str())));
            }
            out.push_str(&format!(" {}=\"{}\"/>", self.rel_id_attr, escape(sheet.rel_id.as_str())));
        }
        out.push_str(&format!("</{p}sheets>"));
        out
    }

    fn render_defined_names(&self) -> String {
        let p = &self.prefix;
        if self.defined_names.is_empty() {
            return String::new();
        }
        let mut out = format!("<{p}definedNames>");
        for dn in &self.defined_names {
            out.push_str(&format!("<{p}definedName name=\"{}\"", escape(dn.name.as_str())));
            if let Some(id) = dn.local_sheet_id {
                out.push_str(&format!(" localSheetId=\"{}\"", id));
            }
            for (key, value) in &dn.attrs {
                out.push_str(&format!(" {}=\"{}\"", key, value));
            }
            out.push_str(&format!(">{}</{p}definedName>", partial_escape(dn.value.as_str())));
        }
        out.push_str(&format!("</{p}definedNames>"));
        out
    }
}

fn parse_sheet_entry(e: &BytesStart) -> Result<(SheetEntry, Option<String>)> {
    let mut entry = SheetEntry {
        name: String::new(),
        sheet_id: 0,
        rel_id: String::new(),
        state: None,
    };
    let mut rel_attr = None;

    for attr in e.attributes() {
        let attr = attr?;
        let key = attr.key.as_ref();
        let value = attr.unescape_value()?.into_owned();
        match key {
            b"name" => entry.name = value,
            b"sheetId" => entry.sheet_id = value.parse().unwrap_or(0),
            b"state" => entry.state = Some(value),
            _ if key.ends_with(b":id") => {
                entry.rel_id = value;
                rel_attr = Some(String::from_utf8_lossy(key).into_owned());
            }
            _ => {}
        }
    }

    Ok((entry, rel_attr))
}

fn parse_defined_names(reader: &mut Reader<&[u8]>) -> Result<Vec<DefinedName>> {
    let mut names = Vec::new();
    let mut current: Option<DefinedName> = None;

    loop {
        match reader.read_event()? {
            Event::Start(e) if e.local_name().as_ref() == b"definedName" => {
                current = Some(parse_defined_name_attrs(&e)?);
            }
            Event::Empty(e) if e.local_name().as_ref() == b"definedName" => {
                names.push(parse_defined_name_attrs(&e)?);
            }
            Event::Text(t) => {
                if let Some(dn) = current.as_mut() {
                    dn.value.push_str(&t.unescape()?);
                }
            }
            Event::End(e) if e.local_name().as_ref() == b"definedName" => {
                if let Some(dn) = current.take() {
                    names.push(dn);
                }
            }
            Event::End(e) if e.local_name().as_ref() == b"definedNames" => break,
            Event::Eof => return Err(Error::Parse("definedNames가 닫히지 않았습니다".to_string())),
            _ => {}
        }
    }

    Ok(names)
}

fn parse_defined_name_attrs(e: &BytesStart) -> Result<DefinedName> {
    let mut dn = DefinedName {
        name: String::new(),
        local_sheet_id: None,
        attrs: Vec::new(),
        value: String::new(),
    };
    for attr in e.attributes() {
        let attr = attr?;
        match attr.key.as_ref() {
            b"name" => dn.name = attr.unescape_value()?.into_owned(),
            b"localSheetId" => dn.local_sheet_id = attr.unescape_value()?.parse().ok(),
            key => dn.attrs.push((
                String::from_utf8_lossy(key).into_owned(),
                String::from_utf8_lossy(&attr.value).into_owned(),
            )),
        }
    }
    Ok(dn)
}
