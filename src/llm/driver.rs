use crate::console;
use crate::exceptions::ParleyError;
use crate::llm::api_models::{
    AnthropicDelta, AnthropicEvent, AnthropicResponse, ChatCompletionChunk,
    ChatCompletionResponse, SearchResult,
};
use crate::llm::client::{Dialect, ModelHandle, parse_sse_data};
use crate::models::{ChatMessage, Source};
use futures_util::TryStreamExt;
use std::io::Write;
use std::time::{Duration, Instant};
use tokio::io::AsyncBufReadExt;

/// Final text plus citation sources and elapsed wall-clock time. In
/// incremental delivery the text is the concatenation of the printed
/// fragments, in arrival order.
pub struct DriverReply {
    pub text: String,
    pub sources: Vec<Source>,
    pub duration: Duration,
}

/// Incremental delivery: fragments go to stdout as they arrive, followed by
/// a citation footer and an elapsed-time note on stderr.
pub async fn stream_response(
    handle: &ModelHandle,
    messages: &[ChatMessage],
) -> Result<DriverReply, ParleyError> {
    let started = Instant::now();
    let response = handle.send_chat(messages, true).await?;

    let stream = response.bytes_stream().map_err(std::io::Error::other);
    let reader = tokio_util::io::StreamReader::new(stream);
    let mut lines = tokio::io::BufReader::new(reader).lines();

    let mut full_text = String::new();
    let mut sources: Vec<Source> = Vec::new();
    let mut stdout = std::io::stdout();

    while let Some(line) = lines.next_line().await? {
        let Some(data) = parse_sse_data(&line) else {
            continue;
        };

        match handle.dialect() {
            Dialect::ChatCompletions => {
                let Ok(chunk) = serde_json::from_str::<ChatCompletionChunk>(data) else {
                    continue;
                };

                if let Some(found) =
                    collect_sources(chunk.search_results.as_deref(), chunk.citations.as_deref())
                {
                    sources = found;
                }

                if let Some(choice) = chunk.choices.first()
                    && let Some(ref fragment) = choice.delta.content
                    && !fragment.is_empty()
                {
                    write!(stdout, "{}", fragment)?;
                    stdout.flush()?;
                    full_text.push_str(fragment);
                }
            }
            Dialect::AnthropicMessages => {
                let Ok(event) = serde_json::from_str::<AnthropicEvent>(data) else {
                    continue;
                };

                if let AnthropicEvent::ContentBlockDelta {
                    delta: AnthropicDelta::TextDelta { text },
                } = event
                {
                    write!(stdout, "{}", text)?;
                    stdout.flush()?;
                    full_text.push_str(&text);
                }
            }
        }
    }

    writeln!(stdout)?;
    stdout.flush()?;

    console::print_sources(&sources);

    let duration = started.elapsed();
    console::print_elapsed(duration);

    Ok(DriverReply {
        text: full_text,
        sources,
        duration,
    })
}

/// Batch delivery: one call, complete text once generation finishes.
pub async fn generate_response(
    handle: &ModelHandle,
    messages: &[ChatMessage],
) -> Result<DriverReply, ParleyError> {
    let started = Instant::now();
    let response = handle.send_chat(messages, false).await?;

    let (text, sources) = match handle.dialect() {
        Dialect::ChatCompletions => {
            let body: ChatCompletionResponse = response
                .json()
                .await
                .map_err(|e| ParleyError::Provider(e.to_string()))?;

            let sources =
                collect_sources(body.search_results.as_deref(), body.citations.as_deref())
                    .unwrap_or_default();
            let text = body
                .choices
                .into_iter()
                .next()
                .map(|choice| choice.message.content)
                .unwrap_or_default();
            (text, sources)
        }
        Dialect::AnthropicMessages => {
            let body: AnthropicResponse = response
                .json()
                .await
                .map_err(|e| ParleyError::Provider(e.to_string()))?;

            let text = body
                .content
                .iter()
                .filter(|block| block.content_type == "text")
                .map(|block| block.text.as_str())
                .collect::<Vec<_>>()
                .join("");
            (text, Vec::new())
        }
    };

    Ok(DriverReply {
        text,
        sources,
        duration: started.elapsed(),
    })
}

/// Perplexity citation metadata: `search_results` carries titles and urls,
/// the older `citations` field bare urls. Returns None when neither is
/// present so callers can keep earlier chunks' sources.
pub fn collect_sources(
    search_results: Option<&[SearchResult]>,
    citations: Option<&[String]>,
) -> Option<Vec<Source>> {
    if let Some(results) = search_results
        && !results.is_empty()
    {
        return Some(
            results
                .iter()
                .map(|result| Source {
                    title: result.title.clone(),
                    url: result.url.clone(),
                })
                .collect(),
        );
    }

    if let Some(urls) = citations
        && !urls.is_empty()
    {
        return Some(
            urls.iter()
                .map(|url| Source {
                    title: None,
                    url: Some(url.clone()),
                })
                .collect(),
        );
    }

    None
}
