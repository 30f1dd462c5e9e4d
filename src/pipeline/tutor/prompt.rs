/// Yes/No relevance question for the remote model. The query is embedded verbatim.
pub fn classification_prompt(query: &str) -> String {
    format!(
        "Determine if the following query is related to the field of Data Science. \
         Query: '{query}'\n\
         Respond with 'Yes' if it is related to Data Science, 'No' if it is not, \
         and provide a short explanation."
    )
}

/// Three-section explanation request: theory, mathematics, Python code.
pub fn explanation_prompt(query: &str) -> String {
    format!(
        "Explain the topic '{query}' in a detailed, structured way. \
         Please provide the following sections in this order: \n\
         1. **Complete Theory Description:** Provide a detailed theoretical explanation of the topic. \n\
         2. **Mathematical Description:** Include the relevant mathematical equations and explanations. \n\
         3. **Python Code Snippet:** Provide a Python code example that demonstrates how to implement \
         this concept, along with a detailed explanation of the code. \n\
         Make sure each section is clearly marked, and provide all necessary details in a clean and \
         readable format."
    )
}
