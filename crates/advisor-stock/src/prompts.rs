//! Prompt templates for the advisory report

use crate::error::{Result, StockError};
use crate::ticker::Ticker;
use minijinja::{Environment, context};

/// Persona and formatting rules sent as the system instruction on every call
pub const SYSTEM_INSTRUCTION: &str = "你是一位專業、客觀且數據導向的「台股投資分析助理」。你的任務是協助使用者快速分析台灣上市櫃股票與 ETF。
請絕對嚴格遵守以下規則：
1. 數據來源：所有分析必須獨家使用使用者提供的「當前收盤價」，嚴禁對該價格的正確性或歷史數據進行評論、質疑或警告。
2. 分析核心：你的職責是基於該價格計算和評估，不要顯示任何關於「價格過時」或「價格錯誤」的警告。
3. 新增任務：在完成主要分析報告後，你必須主動從市場中挑選 2 檔與主要標的（股票或 ETF）類型最相似、最具競爭力的標的，並針對這 3 檔標的進行一次綜合比較分析。
4. 格式要求：
    * 第一部分：必須以【📊...】、【💰...】、【📈...】、【⚠️...】、【💡...】的結構輸出主要標的的分析報告。
    * 第二部分：必須在第一部分結束後，獨立標註 【🆚 競爭標的綜合比較】 作為標題。內容需包含一張表格，比較 3 檔標的。對於主要標的，使用提供的最新收盤價；**對於挑選的 2 檔比較標的，必須利用你的即時搜索功能查出其最新的收盤價**，然後進行分析比較（比較類型、規模、費用率、近一年績效、和當前股價）。
請使用繁體中文。
免責聲明：本分析僅供參考，不代表投資建議，投資前請審慎評估。
";

/// Per-request prompt; `price` is preformatted with two decimals
const ANALYSIS_TEMPLATE: &str = "請詳細分析台股代號 {{ ticker }}。當前最新收盤價是 {{ price }}。所有分析務必以此價格為唯一基準進行評估。請遵循我們設定好的格式，並執行比較任務。";

/// Section headers the system instruction asks for, in order
pub const EXPECTED_SECTIONS: [&str; 6] = [
    "【📊",
    "【💰",
    "【📈",
    "【⚠️",
    "【💡",
    "【🆚 競爭標的綜合比較】",
];

/// Render the user prompt for one ticker and its latest close
pub fn analysis_prompt(ticker: &Ticker, latest_close: f64) -> Result<String> {
    let env = Environment::new();
    env.render_str(
        ANALYSIS_TEMPLATE,
        context! {
            ticker => ticker.as_str(),
            price => format!("{latest_close:.2}"),
        },
    )
    .map_err(|e| StockError::PromptError(e.to_string()))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_prompt_embeds_ticker_and_price() {
        let prompt = analysis_prompt(&Ticker::normalize("2330"), 1085.456).unwrap();
        assert!(prompt.contains("2330.TW"));
        assert!(prompt.contains("當前最新收盤價是 1085.46。"));
        assert!(!prompt.contains("{{"));
    }

    #[test]
    fn test_prompt_pads_two_decimals() {
        let prompt = analysis_prompt(&Ticker::normalize("0050"), 180.0).unwrap();
        assert!(prompt.contains("180.00"));
    }

    #[test]
    fn test_system_instruction_lists_sections() {
        for header in EXPECTED_SECTIONS {
            assert!(SYSTEM_INSTRUCTION.contains(header), "missing {header}");
        }
        assert!(SYSTEM_INSTRUCTION.contains("繁體中文"));
    }
}
