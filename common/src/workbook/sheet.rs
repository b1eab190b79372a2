//! 워크시트 XML 모델
//!
//! `<sheetData>`는 행/셀 단위로 풀어서 들고, 그 밖의 XML(열 너비, 인쇄 설정,
//! 조건부 서식 등)은 원문 그대로 보관한다. 값을 바꾸지 않은 셀은 원래의
//! 속성과 내용을 그대로 다시 쓴다.

use super::address::{cell_ref, parse_cell_ref};
use super::parts::element_prefix;
use crate::error::{Error, Result};
use quick_xml::escape::{escape, partial_escape};
use quick_xml::events::{BytesStart, Event};
use quick_xml::Reader;
use regex::Regex;
use std::collections::BTreeMap;

lazy_static::lazy_static! {
    static ref TAB_SELECTED_RE: Regex = Regex::new(r#"\s+tabSelected="(?:1|true)""#).unwrap();
    /// 복사본에 따라가지 않는 개체 참조 (그림, 메모, 표)
    static ref SHEET_OBJECT_RE: Regex = Regex::new(
        r"(?s)<(?:\w+:)?(?:drawing|legacyDrawing|legacyDrawingHF|picture)\b[^>]*/>|<(?:\w+:)?tableParts\b[^>]*/>|<(?:\w+:)?tableParts\b[^>]*>.*?</(?:\w+:)?tableParts>"
    )
    .unwrap();
}

/// 셀 값
#[derive(Debug, Clone, PartialEq, Default)]
pub enum CellValue {
    #[default]
    Empty,
    Number(f64),
    Text(String),
    Bool(bool),
    Error(String),
}

impl CellValue {
    pub fn as_text(&self) -> Option<&str> {
        match self {
            CellValue::Text(text) => Some(text),
            _ => None,
        }
    }

    pub fn as_number(&self) -> Option<f64> {
        match self {
            CellValue::Number(n) => Some(*n),
            _ => None,
        }
    }

    /// 값이 없거나 빈 문자열
    pub fn is_blank(&self) -> bool {
        match self {
            CellValue::Empty => true,
            CellValue::Text(text) => text.is_empty(),
            _ => false,
        }
    }
}

/// 읽어 들인 그대로의 셀 (r 속성 제외)
#[derive(Debug, Clone)]
struct RawCell {
    attrs: Vec<(String, String)>,
    inner: String,
}

#[derive(Debug, Clone, Default)]
struct Cell {
    style: Option<String>,
    value: CellValue,
    /// 값을 바꾸면 None
    raw: Option<RawCell>,
}

#[derive(Debug, Clone, Default)]
struct Row {
    /// r, spans 제외
    attrs: Vec<(String, String)>,
    cells: BTreeMap<u32, Cell>,
}

/// 워크시트 한 장
#[derive(Debug, Clone)]
pub struct Worksheet {
    /// 요소 이름 접두사 ("" 또는 "x:")
    prefix: String,
    head: String,
    rows: BTreeMap<u32, Row>,
    between: String,
    merges: Vec<String>,
    tail: String,
}

static EMPTY_VALUE: CellValue = CellValue::Empty;

impl Worksheet {
    /// 워크시트 XML 해석
    ///
    /// # Arguments
    /// * `name` - 시트 이름 (오류 메시지용)
    /// * `xml` - `xl/worksheets/sheetN.xml` 내용
    /// * `shared_strings` - 공유 문자열 표 (`t="s"` 셀 해석용)
    pub(crate) fn parse(name: &str, xml: &str, shared_strings: &[String]) -> Result<Self> {
        let mut reader = Reader::from_str(xml);
        reader.config_mut().trim_text(false);

        let mut prefix = String::new();
        let mut data_span: Option<(usize, usize)> = None;
        let mut merge_span: Option<(usize, usize)> = None;
        let mut rows = BTreeMap::new();
        let mut merges = Vec::new();

        loop {
            let start = reader.buffer_position() as usize;
            match reader.read_event()? {
                Event::Start(e) if e.local_name().as_ref() == b"sheetData" => {
                    prefix = element_prefix(&e);
                    rows = parse_sheet_data(&mut reader, xml, shared_strings)?;
                    data_span = Some((start, reader.buffer_position() as usize));
                }
                Event::Empty(e) if e.local_name().as_ref() == b"sheetData" => {
                    prefix = element_prefix(&e);
                    data_span = Some((start, reader.buffer_position() as usize));
                }
                Event::Start(e) if e.local_name().as_ref() == b"mergeCells" => {
                    merges = parse_merge_cells(&mut reader)?;
                    merge_span = Some((start, reader.buffer_position() as usize));
                }
                Event::Empty(e) if e.local_name().as_ref() == b"mergeCells" => {
                    merge_span = Some((start, reader.buffer_position() as usize));
                }
                Event::Eof => break,
                _ => {}
            }
        }

        let (data_start, data_end) =
            data_span.ok_or_else(|| Error::Parse(format!("시트 '{}'에 sheetData가 없습니다", name)))?;

        let (between, tail) = match merge_span {
            Some((merge_start, merge_end)) if merge_start >= data_end => (
                xml[data_end..merge_start].to_string(),
                xml[merge_end..].to_string(),
            ),
            _ => (xml[data_end..].to_string(), String::new()),
        };

        Ok(Self {
            prefix,
            head: xml[..data_start].to_string(),
            rows,
            between,
            merges,
            tail,
        })
    }

    /// XML로 다시 쓰기
    pub(crate) fn to_xml(&self) -> String {
        let p = &self.prefix;
        let mut out = String::with_capacity(self.head.len() + self.tail.len() + self.rows.len() * 512);
        out.push_str(&self.head);

        if self.rows.is_empty() {
            out.push_str(&format!("<{p}sheetData/>"));
        } else {
            out.push_str(&format!("<{p}sheetData>"));
            for (&number, row) in &self.rows {
                write_row(&mut out, p, number, row);
            }
            out.push_str(&format!("</{p}sheetData>"));
        }

        out.push_str(&self.between);
        if !self.merges.is_empty() {
            out.push_str(&format!("<{p}mergeCells count=\"{}\">", self.merges.len()));
            for range in &self.merges {
                out.push_str(&format!("<{p}mergeCell ref=\"{}\"/>", range));
            }
            out.push_str(&format!("</{p}mergeCells>"));
        }
        out.push_str(&self.tail);
        out
    }

    /// 셀 값 (행・열 1부터). 없는 셀은 Empty
    pub fn value(&self, row: u32, col: u32) -> &CellValue {
        self.cell(row, col).map(|c| &c.value).unwrap_or(&EMPTY_VALUE)
    }

    /// 문자열 셀이면 그 내용
    pub fn text(&self, row: u32, col: u32) -> Option<&str> {
        self.value(row, col).as_text()
    }

    /// 값 쓰기. 셀 서식은 유지된다.
    fn set_value(&mut self, row: u32, col: u32, value: CellValue) {
        let cell = self
            .rows
            .entry(row)
            .or_default()
            .cells
            .entry(col)
            .or_default();
        cell.value = value;
        cell.raw = None;
    }

    pub fn set_text(&mut self, row: u32, col: u32, text: &str) {
        self.set_value(row, col, CellValue::Text(text.to_string()));
    }

    pub fn set_number(&mut self, row: u32, col: u32, n: f64) {
        self.set_value(row, col, CellValue::Number(n));
    }

    /// 데이터가 있는 행 번호 (오름차순)
    pub fn row_numbers(&self) -> Vec<u32> {
        self.rows.keys().copied().collect()
    }

    /// 병합 영역 ("A1:C1" 형식)
    pub fn merges(&self) -> &[String] {
        &self.merges
    }

    /// 시트 복사본
    ///
    /// 값・서식・병합 영역은 그대로 가져가고, 탭 선택 상태와
    /// 그림/메모/표 참조는 떼어낸다.
    pub(crate) fn duplicate(&self) -> Worksheet {
        let mut copy = self.clone();
        copy.head = strip_sheet_objects(&TAB_SELECTED_RE.replace_all(&copy.head, ""));
        copy.between = strip_sheet_objects(&copy.between);
        copy.tail = strip_sheet_objects(&copy.tail);
        copy
    }

    /// 탭 선택 해제
    pub(crate) fn clear_tab_selected(&mut self) {
        if TAB_SELECTED_RE.is_match(&self.head) {
            self.head = TAB_SELECTED_RE.replace_all(&self.head, "").into_owned();
        }
    }

    fn cell(&self, row: u32, col: u32) -> Option<&Cell> {
        self.rows.get(&row).and_then(|r| r.cells.get(&col))
    }
}

fn strip_sheet_objects(xml: &str) -> String {
    SHEET_OBJECT_RE.replace_all(xml, "").into_owned()
}

fn raw_attrs(e: &BytesStart) -> Result<Vec<(String, String)>> {
    let mut attrs = Vec::new();
    for attr in e.attributes() {
        let attr = attr?;
        attrs.push((
            String::from_utf8_lossy(attr.key.as_ref()).into_owned(),
            String::from_utf8_lossy(&attr.value).into_owned(),
        ));
    }
    Ok(attrs)
}

fn attr_value<'a>(attrs: &'a [(String, String)], key: &str) -> Option<&'a str> {
    attrs.iter().find(|(k, _)| k == key).map(|(_, v)| v.as_str())
}

fn parse_sheet_data(
    reader: &mut Reader<&[u8]>,
    xml: &str,
    shared_strings: &[String],
) -> Result<BTreeMap<u32, Row>> {
    let mut rows = BTreeMap::new();
    let mut next_row = 1;

    loop {
        match reader.read_event()? {
            Event::Start(e) if e.local_name().as_ref() == b"row" => {
                let (number, attrs) = row_attrs(&e, next_row)?;
                let cells = parse_row_cells(reader, xml, number, shared_strings)?;
                rows.insert(number, Row { attrs, cells });
                next_row = number + 1;
            }
            Event::Empty(e) if e.local_name().as_ref() == b"row" => {
                let (number, attrs) = row_attrs(&e, next_row)?;
                rows.insert(number, Row { attrs, cells: BTreeMap::new() });
                next_row = number + 1;
            }
            Event::End(e) if e.local_name().as_ref() == b"sheetData" => break,
            Event::Eof => return Err(Error::Parse("sheetData가 닫히지 않았습니다".to_string())),
            _ => {}
        }
    }

    Ok(rows)
}

fn row_attrs(e: &BytesStart, fallback: u32) -> Result<(u32, Vec<(String, String)>)> {
    let mut number = fallback;
    let mut attrs = Vec::new();
    for (key, value) in raw_attrs(e)? {
        match key.as_str() {
            "r" => {
                number = value
                    .parse()
                    .map_err(|_| Error::Parse(format!("행 번호가 잘못되었습니다: {}", value)))?;
            }
            "spans" => {}
            _ => attrs.push((key, value)),
        }
    }
    Ok((number, attrs))
}

fn parse_row_cells(
    reader: &mut Reader<&[u8]>,
    xml: &str,
    row: u32,
    shared_strings: &[String],
) -> Result<BTreeMap<u32, Cell>> {
    let mut cells = BTreeMap::new();
    let mut next_col = 1;

    loop {
        match reader.read_event()? {
            Event::Start(e) if e.local_name().as_ref() == b"c" => {
                let (col, attrs) = cell_attrs(&e, row, next_col)?;
                let inner_start = reader.buffer_position() as usize;
                let (inner_end, content) = read_cell_content(reader)?;
                let value = resolve_value(attr_value(&attrs, "t"), content, shared_strings);
                let style = attr_value(&attrs, "s").map(str::to_string);
                let inner = xml[inner_start..inner_end].to_string();
                cells.insert(col, Cell { style, value, raw: Some(RawCell { attrs, inner }) });
                next_col = col + 1;
            }
            Event::Empty(e) if e.local_name().as_ref() == b"c" => {
                let (col, attrs) = cell_attrs(&e, row, next_col)?;
                let style = attr_value(&attrs, "s").map(str::to_string);
                let raw = RawCell { attrs, inner: String::new() };
                cells.insert(col, Cell { style, value: CellValue::Empty, raw: Some(raw) });
                next_col = col + 1;
            }
            Event::End(e) if e.local_name().as_ref() == b"row" => break,
            Event::Eof => return Err(Error::Parse(format!("{}행이 닫히지 않았습니다", row))),
            _ => {}
        }
    }

    Ok(cells)
}

fn cell_attrs(e: &BytesStart, row: u32, fallback: u32) -> Result<(u32, Vec<(String, String)>)> {
    let mut col = fallback;
    let mut attrs = Vec::new();
    for (key, value) in raw_attrs(e)? {
        if key == "r" {
            if let Some((_, c)) = parse_cell_ref(&value) {
                col = c;
            } else {
                return Err(Error::Parse(format!("{}행의 셀 주소가 잘못되었습니다: {}", row, value)));
            }
        } else {
            attrs.push((key, value));
        }
    }
    Ok((col, attrs))
}

#[derive(Debug, Default)]
struct CellContent {
    value: Option<String>,
    inline: Option<String>,
}

/// `<c>` 내부를 읽고 `</c>` 직전 위치를 돌려준다
fn read_cell_content(reader: &mut Reader<&[u8]>) -> Result<(usize, CellContent)> {
    let mut content = CellContent::default();
    let mut open: Vec<Vec<u8>> = Vec::new();

    loop {
        let before = reader.buffer_position() as usize;
        match reader.read_event()? {
            Event::Start(e) => open.push(e.local_name().as_ref().to_vec()),
            Event::End(e) => {
                if open.is_empty() && e.local_name().as_ref() == b"c" {
                    return Ok((before, content));
                }
                open.pop();
            }
            Event::Text(t) => {
                let text = t.unescape()?;
                let in_inline = open.iter().any(|n| n == b"is") && !open.iter().any(|n| n == b"rPh");
                match open.last().map(Vec::as_slice) {
                    Some(b"v") => content.value.get_or_insert_with(String::new).push_str(&text),
                    Some(b"t") if in_inline => {
                        content.inline.get_or_insert_with(String::new).push_str(&text)
                    }
                    _ => {}
                }
            }
            Event::Eof => return Err(Error::Parse("셀이 닫히지 않았습니다".to_string())),
            _ => {}
        }
    }
}

fn resolve_value(cell_type: Option<&str>, content: CellContent, shared_strings: &[String]) -> CellValue {
    match cell_type {
        Some("s") => content
            .value
            .and_then(|v| v.trim().parse::<usize>().ok())
            .and_then(|idx| shared_strings.get(idx).cloned())
            .map(CellValue::Text)
            .unwrap_or_default(),
        Some("inlineStr") => content.inline.map(CellValue::Text).unwrap_or_default(),
        Some("str") | Some("d") => content.value.map(CellValue::Text).unwrap_or_default(),
        Some("b") => content
            .value
            .map(|v| CellValue::Bool(matches!(v.trim(), "1" | "true")))
            .unwrap_or_default(),
        Some("e") => content.value.map(CellValue::Error).unwrap_or_default(),
        _ => content
            .value
            .and_then(|v| v.trim().parse::<f64>().ok())
            .map(CellValue::Number)
            .unwrap_or_default(),
    }
}

fn parse_merge_cells(reader: &mut Reader<&[u8]>) -> Result<Vec<String>> {
    let mut merges = Vec::new();
    loop {
        match reader.read_event()? {
            Event::Start(e) | Event::Empty(e) if e.local_name().as_ref() == b"mergeCell" => {
                for attr in e.attributes() {
                    let attr = attr?;
                    if attr.key.as_ref() == b"ref" {
                        merges.push(attr.unescape_value()?.into_owned());
                    }
                }
            }
            Event::End(e) if e.local_name().as_ref() == b"mergeCells" => break,
            Event::Eof => return Err(Error::Parse("mergeCells가 닫히지 않았습니다".to_string())),
            _ => {}
        }
    }
    Ok(merges)
}

fn push_attrs(out: &mut String, attrs: &[(String, String)]) {
    for (key, value) in attrs {
        out.push_str(&format!(" {}=\"{}\"", key, value));
    }
}

fn write_row(out: &mut String, p: &str, number: u32, row: &Row) {
    out.push_str(&format!("<{p}row r=\"{number}\""));
    push_attrs(out, &row.attrs);
    if row.cells.is_empty() {
        out.push_str("/>");
        return;
    }
    out.push('>');
    for (&col, cell) in &row.cells {
        write_cell(out, p, number, col, cell);
    }
    out.push_str(&format!("</{p}row>"));
}

fn write_cell(out: &mut String, p: &str, row: u32, col: u32, cell: &Cell) {
    out.push_str(&format!("<{p}c r=\"{}\"", cell_ref(row, col)));

    if let Some(raw) = &cell.raw {
        push_attrs(out, &raw.attrs);
        if raw.inner.is_empty() {
            out.push_str("/>");
        } else {
            out.push('>');
            out.push_str(&raw.inner);
            out.push_str(&format!("</{p}c>"));
        }
        return;
    }

    if let Some(style) = &cell.style {
        out.push_str(&format!(" s=\"{}\"", style));
    }
    match &cell.value {
        CellValue::Empty => out.push_str("/>"),
        CellValue::Number(n) => out.push_str(&format!("><{p}v>{n}</{p}v></{p}c>")),
        CellValue::Text(text) => out.push_str(&format!(
            " t=\"inlineStr\"><{p}is><{p}t xml:space=\"preserve\">{}</{p}t></{p}is></{p}c>",
            partial_escape(text.as_str())
        )),
        CellValue::Bool(b) => out.push_str(&format!(" t=\"b\"><{p}v>{}</{p}v></{p}c>", u8::from(*b))),
        CellValue::Error(e) => out.push_str(&format!(" t=\"e\"><{p}v>{}</{p}v></{p}c>", escape(e.as_str()))),
    }
}
