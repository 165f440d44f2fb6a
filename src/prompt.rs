use crate::models::Difficulty;

pub fn ocr_instructions() -> String {
    concat!(
        "Te rog să citești textul din această imagine (poate fi scris de mână sau tipărit). ",
        "Răspunde în format JSON cu 2 câmpuri:\n",
        "1. 'text_extras': textul complet extras din imagine, exact așa cum apare\n",
        "2. 'summary': un rezumat concis de 2-3 propoziții care explică ideea principală\n\n",
        "Exemplu format răspuns:\n",
        "{\"text_extras\": \"textul complet aici\", \"summary\": \"rezumatul aici\"}\n\n",
        "Returnează DOAR JSON-ul, fără alt text."
    )
    .to_string()
}

pub fn quiz_instructions(text: &str, difficulty: Difficulty, num_questions: u32) -> String {
    format!(
        r#"Analizează următorul text și generează {num_questions} întrebări de quiz în limba română.

{instruction}

Textul pentru analiză:
{text}

Răspunde DOAR cu un JSON în următorul format:
{{
  "questions": [
    {{
      "question": "Întrebarea aici?",
      "options": ["Opțiunea A", "Opțiunea B", "Opțiunea C", "Opțiunea D"],
      "correct_answer": 0,
      "explanation": "Explicație scurtă pentru răspunsul corect"
    }}
  ]
}}

IMPORTANT:
- "correct_answer" este index-ul (0-3) al răspunsului corect din array-ul "options"
- Fiecare întrebare trebuie să aibă exact 4 opțiuni
- Întrebările trebuie să fie relevante pentru textul dat
- Returnează DOAR JSON-ul, fără alt text
"#,
        instruction = difficulty.instruction(),
    )
}

pub fn grammar_instructions(text: &str) -> String {
    format!(
        r#"Corectează greșelile gramaticale, de ortografie și de punctuație din textul următor, scris în limba română. Păstrează sensul și stilul autorului.

Textul:
{text}

Răspunde DOAR cu un JSON în următorul format:
{{
  "corrected_text": "textul complet corectat",
  "corrections": ["scurtă descriere a fiecărei corecturi"]
}}

Dacă textul nu are greșeli, returnează textul neschimbat și o listă goală de corecturi.
Returnează DOAR JSON-ul, fără alt text.
"#
    )
}
