//! 테스트용 통합문서 생성 (rust_xlsxwriter)

use rust_xlsxwriter::{Format, Workbook};

enum CellSpec {
    Text(String),
    Number(f64),
    /// 날짜 서식이 걸린 일련번호
    Date(f64),
}

/// 시트 한 장의 내용. 행・열은 1부터.
pub(crate) struct SheetSpec {
    name: String,
    cells: Vec<(u32, u32, CellSpec)>,
    merges: Vec<(u32, u32, u32, u32)>,
    print_area: Option<(u32, u32, u32, u32)>,
}

impl SheetSpec {
    pub(crate) fn new(name: &str) -> Self {
        Self {
            name: name.to_string(),
            cells: Vec::new(),
            merges: Vec::new(),
            print_area: None,
        }
    }

    pub(crate) fn text(mut self, row: u32, col: u32, text: &str) -> Self {
        self.cells.push((row, col, CellSpec::Text(text.to_string())));
        self
    }

    pub(crate) fn number(mut self, row: u32, col: u32, n: f64) -> Self {
        self.cells.push((row, col, CellSpec::Number(n)));
        self
    }

    pub(crate) fn date(mut self, row: u32, col: u32, serial: f64) -> Self {
        self.cells.push((row, col, CellSpec::Date(serial)));
        self
    }

    pub(crate) fn merge(mut self, first_row: u32, first_col: u32, last_row: u32, last_col: u32) -> Self {
        self.merges.push((first_row, first_col, last_row, last_col));
        self
    }

    pub(crate) fn print_area(mut self, first_row: u32, first_col: u32, last_row: u32, last_col: u32) -> Self {
        self.print_area = Some((first_row, first_col, last_row, last_col));
        self
    }
}

pub(crate) fn build_workbook(sheets: &[SheetSpec]) -> Vec<u8> {
    let mut workbook = Workbook::new();
    let date_format = Format::new().set_num_format("yyyy-mm-dd");
    let plain = Format::new();

    for spec in sheets {
        let worksheet = workbook.add_worksheet();
        worksheet.set_name(&spec.name).expect("시트 이름");

        for &(r1, c1, r2, c2) in &spec.merges {
            worksheet
                .merge_range(r1 - 1, (c1 - 1) as u16, r2 - 1, (c2 - 1) as u16, "", &plain)
                .expect("병합");
        }
        for (row, col, cell) in &spec.cells {
            let (row, col) = (row - 1, (col - 1) as u16);
            match cell {
                CellSpec::Text(text) => worksheet.write_string(row, col, text).map(|_| ()),
                CellSpec::Number(n) => worksheet.write_number(row, col, *n).map(|_| ()),
                CellSpec::Date(serial) => worksheet
                    .write_number_with_format(row, col, *serial, &date_format)
                    .map(|_| ()),
            }
            .expect("셀 쓰기");
        }
        if let Some((r1, c1, r2, c2)) = spec.print_area {
            worksheet
                .set_print_area(r1 - 1, (c1 - 1) as u16, r2 - 1, (c2 - 1) as u16)
                .expect("인쇄 영역");
        }
    }

    workbook.save_to_buffer().expect("통합문서 저장")
}
