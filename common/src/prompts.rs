//! プロンプト生成モジュール
//!
//! Gemini / OpenAI互換の両バックエンドで共有する翻訳プロンプト。

use serde::Serialize;

/// OpenAI互換APIのシステムメッセージ
pub const SYSTEM_MESSAGE: &str =
    "你是一位能翻译JSON数据的得力助手。特别是 Maxon Cinema 4D 和 Corona Renderer等软件汉化翻译";

/// プロンプトに埋め込む1件
#[derive(Debug, Clone, Serialize)]
pub struct PromptItem<'a> {
    pub id: String,
    pub text: &'a str,
}

/// 翻訳プロンプト生成
///
/// # Arguments
/// * `items` - (ID, 原文) のスライス
/// * `strict_json` - JSON配列のみを返すよう追加で指示する（スキーマ指定ができないAPI向け）
pub fn build_translation_prompt(items: &[PromptItem<'_>], strict_json: bool) -> String {
    let payload = serde_json::to_string(items).unwrap_or_else(|_| "[]".to_string());

    let extra_rules = if strict_json {
        "\n4. 仅返回有效的 JSON 数组。请勿输入 Markdown 代码块。\n\n5. ‘Corona’不需要翻译，保持Corona。\n\n6. 不要输入其它内容，直接输出结果。\n"
    } else {
        ""
    };

    let example = if strict_json {
        "\n输出格式示例：\n[{\"id\": \"...\", \"translatedText\": \"...\"}]\n"
    } else {
        ""
    };

    format!(
        r#"您是一位专业翻译，专精于 3D 计算机图形软件，特别是 Maxon Cinema 4D 和 Corona Renderer。

请将以下英文技术术语和用户界面字符串翻译成简体中文 (zh-CN)。以满足对软件插件的汉化。

规则：

1. 确保技术术语准确专业，符合Maxon Cinema 4D官方翻译逻辑（例如，“漫反射”、“焦散”、“GI”、“LUT”）。

2. 要求简洁，适合用户界面标签。

3. 如果存在变量占位符（例如，%s、%d），则无需翻译。
{extra_rules}
待翻译内容：
{payload}
{example}"#
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_prompt_embeds_items_as_json() {
        let items = vec![
            PromptItem { id: "1".to_string(), text: "Diffuse" },
            PromptItem { id: "2".to_string(), text: "Use \"%s\"" },
        ];
        let prompt = build_translation_prompt(&items, false);
        assert!(prompt.contains(r#"{"id":"1","text":"Diffuse"}"#));
        assert!(prompt.contains(r#"Use \"%s\""#));
        assert!(prompt.contains("简体中文"));
        assert!(!prompt.contains("输出格式示例"));
    }

    #[test]
    fn test_strict_prompt_adds_json_rules() {
        let items = vec![PromptItem { id: "7".to_string(), text: "Corona Sun" }];
        let prompt = build_translation_prompt(&items, true);
        assert!(prompt.contains("仅返回有效的 JSON 数组"));
        assert!(prompt.contains("保持Corona"));
        assert!(prompt.contains("translatedText"));
    }
}
